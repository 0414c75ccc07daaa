use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Externally reachable base URL; checkout redirects are derived from it.
    pub public_url: String,
    pub cors_origins: Vec<String>,
    /// One-time unlock price in minor units (cents).
    pub premium_price_cents: i64,
    /// ISO 4217 code, lowercase.
    pub currency: String,
    /// Product line shown on the provider's checkout page.
    pub product_name: String,
    /// Idle sessions older than this are discarded, gate state included.
    pub session_ttl_minutes: u64,
    pub session_sweep_interval_ms: u64,
    pub provider_mode: ProviderMode,
    pub stripe_secret_key: Option<String>,
    pub generation_api_key: Option<String>,
    pub generation_base_url: String,
    pub generation_model: String,
    pub generation_max_tokens: u32,
}

/// Which collaborator adapters the server wires in at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderMode {
    /// In-process stand-ins; no network calls, no real payments.
    Mock,
    /// Stripe checkout + hosted chat-completions generation.
    Live,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("BILLWISE_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            public_url: std::env::var("BILLWISE_PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            cors_origins: std::env::var("BILLWISE_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            premium_price_cents: std::env::var("BILLWISE_PREMIUM_PRICE_CENTS")
                .unwrap_or_else(|_| "499".to_string())
                .parse()
                .map_err(|e| format!("invalid premium price: {e}"))?,
            currency: std::env::var("BILLWISE_CURRENCY")
                .unwrap_or_else(|_| "cad".to_string())
                .to_lowercase(),
            product_name: std::env::var("BILLWISE_PRODUCT_NAME")
                .unwrap_or_else(|_| "Full Savings Strategy Unlock".to_string()),
            session_ttl_minutes: std::env::var("BILLWISE_SESSION_TTL_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|e| format!("invalid session ttl: {e}"))?,
            session_sweep_interval_ms: 60_000,
            provider_mode: {
                let raw = std::env::var("BILLWISE_PROVIDERS")
                    .unwrap_or_else(|_| "mock".to_string());
                match raw.as_str() {
                    "live" => ProviderMode::Live,
                    _ => ProviderMode::Mock,
                }
            },
            stripe_secret_key: std::env::var("BILLWISE_STRIPE_SECRET_KEY").ok(),
            generation_api_key: std::env::var("BILLWISE_GENERATION_API_KEY").ok(),
            generation_base_url: std::env::var("BILLWISE_GENERATION_BASE_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            generation_model: std::env::var("BILLWISE_GENERATION_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
            generation_max_tokens: std::env::var("BILLWISE_GENERATION_MAX_TOKENS")
                .unwrap_or_else(|_| "800".to_string())
                .parse()
                .map_err(|e| format!("invalid generation max tokens: {e}"))?,
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_minutes * 60)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.session_sweep_interval_ms)
    }
}
