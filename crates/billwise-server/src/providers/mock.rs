use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;

use billwise_core::{
    checkout::{CheckoutProvider, CheckoutRequest, CheckoutSession},
    error::{CheckoutCreationError, GenerationError},
    generator::ContentGenerator,
};

/// In-process Checkout Provider stand-in: returns fabricated session URLs
/// without any network call. Used in mock mode and by integration tests;
/// `failing(n)` arms it to reject the first `n` requests, which exercises
/// the retry path of the gate.
pub struct MockCheckout {
    fail_remaining: AtomicUsize,
    counter: AtomicUsize,
}

impl MockCheckout {
    pub fn new() -> Self {
        Self::failing(0)
    }

    pub fn failing(times: usize) -> Self {
        Self {
            fail_remaining: AtomicUsize::new(times),
            counter: AtomicUsize::new(0),
        }
    }
}

impl Default for MockCheckout {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckout {
    async fn create_session(
        &self,
        _request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutCreationError> {
        if self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(CheckoutCreationError::new(
                "mock checkout failure (injected)",
            ));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let session_url = Url::parse(&format!("https://checkout.invalid/session/cs_mock_{n}"))
            .map_err(|e| CheckoutCreationError::new(e.to_string()))?;
        Ok(CheckoutSession { session_url })
    }
}

/// Content Generator stand-in returning a fixed recommendation.
pub struct CannedGenerator {
    text: String,
}

impl CannedGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for CannedGenerator {
    fn default() -> Self {
        Self::new(
            "Canned premium plan: trim bills, claim rebates, invest the \
             difference. (Mock generator — set BILLWISE_PROVIDERS=live for \
             real output.)",
        )
    }
}

#[async_trait]
impl ContentGenerator for CannedGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _max_output_tokens: u32,
    ) -> Result<String, GenerationError> {
        Ok(self.text.clone())
    }
}
