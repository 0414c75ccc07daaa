pub mod app;
pub mod error;
pub mod providers;
pub mod routes;
pub mod sessions;
pub mod state;
