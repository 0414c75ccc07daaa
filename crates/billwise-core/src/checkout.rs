use async_trait::async_trait;
use url::Url;

use crate::error::CheckoutCreationError;

/// Parameters for a one-time payment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Price in the currency's minor units (cents for CAD).
    pub amount_minor_units: i64,
    /// ISO 4217 currency code, lowercase (e.g. "cad").
    pub currency: String,
    /// Human-readable product line shown on the provider's checkout page.
    pub product_name: String,
    /// Where the provider sends the user after a completed payment. The
    /// completion signal (`payment=success`) rides on this URL's query string.
    pub success_redirect: Url,
    /// Where the provider sends the user after an abandoned payment.
    pub cancel_redirect: Url,
}

/// A payment session created by the Checkout Provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Provider-hosted page the caller presents to the user.
    pub session_url: Url,
}

/// External payment-session service (collaborator, not implemented here).
///
/// Stored as `Arc<dyn CheckoutProvider>` in server state; live and mock
/// adapters live in the server crate.
#[async_trait]
pub trait CheckoutProvider: Send + Sync + 'static {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutCreationError>;
}
