use std::collections::HashMap;

/// Query-parameter key whose value marks a completed checkout.
pub const SUCCESS_KEY: &str = "payment";
/// Value of [`SUCCESS_KEY`] that counts as the success marker.
pub const SUCCESS_VALUE: &str = "success";
/// Optional query-parameter key carrying the provider's opaque session token.
pub const TOKEN_KEY: &str = "checkout_session";

/// The key/value pairs observed on a page load after the user returns from
/// the Checkout Provider — typically the query string of the redirect URL.
///
/// Presence of `payment=success` is the only evidence of payment completion
/// in this design. The marker is not signed and is not verified against the
/// provider; callers that need stronger guarantees must cross-check with a
/// provider webhook before trusting it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSignal {
    params: HashMap<String, String>,
}

impl CompletionSignal {
    /// Build a signal from any collection of string pairs (e.g. a parsed
    /// query string).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// True when the canonical success marker (`payment=success`) is present.
    pub fn has_success_marker(&self) -> bool {
        self.params.get(SUCCESS_KEY).map(String::as_str) == Some(SUCCESS_VALUE)
    }

    /// The provider-issued session token accompanying the marker, if any.
    /// Opaque — captured as the gate's `completion_token`, never validated.
    pub fn token(&self) -> Option<&str> {
        self.params.get(TOKEN_KEY).map(String::as_str)
    }
}
