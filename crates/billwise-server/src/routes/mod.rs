pub mod estimate;
pub mod health;
pub mod premium;
pub mod unlock;
