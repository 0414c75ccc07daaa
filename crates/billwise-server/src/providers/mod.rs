pub mod llm;
pub mod mock;
pub mod stripe;

pub use llm::LlmGenerator;
pub use mock::{CannedGenerator, MockCheckout};
pub use stripe::StripeCheckout;
