use async_trait::async_trait;
use url::Url;

use billwise_core::{
    checkout::{CheckoutProvider, CheckoutRequest, CheckoutSession},
    error::CheckoutCreationError,
};

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Checkout Provider adapter for Stripe Checkout one-time payment sessions.
///
/// Posts form-encoded `/v1/checkout/sessions` requests. Wallet buttons
/// (Apple Pay, Google Pay) ride on the `card` payment method on Stripe's
/// hosted page, so only `card` is requested explicitly.
pub struct StripeCheckout {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeCheckout {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_api_base(secret_key, DEFAULT_API_BASE)
    }

    /// Point the adapter at a non-default API base (stripe-mock, test stubs).
    pub fn with_api_base(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutCreationError> {
        // Stripe substitutes the template at redirect time, which lets the
        // completion signal carry the session token without us guessing it.
        let success_url = format!(
            "{}&checkout_session={{CHECKOUT_SESSION_ID}}",
            request.success_redirect
        );
        let amount = request.amount_minor_units.to_string();
        let form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("success_url", success_url.as_str()),
            ("cancel_url", request.cancel_redirect.as_str()),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", request.currency.as_str()),
            ("line_items[0][price_data][unit_amount]", amount.as_str()),
            (
                "line_items[0][price_data][product_data][name]",
                request.product_name.as_str(),
            ),
            ("payment_method_types[0]", "card"),
        ];

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| CheckoutCreationError::new(format!("stripe request failed: {e}")))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CheckoutCreationError::new(format!("stripe response unreadable: {e}")))?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("stripe rejected the checkout session request");
            return Err(CheckoutCreationError::new(message));
        }

        let session_url = body["url"]
            .as_str()
            .ok_or_else(|| CheckoutCreationError::new("stripe response missing session url"))
            .and_then(|raw| {
                Url::parse(raw)
                    .map_err(|e| CheckoutCreationError::new(format!("invalid session url: {e}")))
            })?;

        Ok(CheckoutSession { session_url })
    }
}
