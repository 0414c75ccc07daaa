pub mod checkout;
pub mod config;
pub mod error;
pub mod estimate;
pub mod gate;
pub mod generator;
pub mod signal;
