use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use billwise_core::{checkout::CheckoutProvider, config::ProviderMode, generator::ContentGenerator};
use billwise_server::providers::{CannedGenerator, LlmGenerator, MockCheckout, StripeCheckout};
use billwise_server::state::AppState;

/// `billwise health` — liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$BILLWISE_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("BILLWISE_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Health-check subcommand — handled before tokio runtime work so the
    // binary stays fast when used as a Docker HEALTHCHECK probe.
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }

    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("billwise=info".parse()?),
        )
        .json()
        .init();

    let cfg = billwise_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Wire the external collaborators per provider mode.
    let (checkout, generator): (Arc<dyn CheckoutProvider>, Arc<dyn ContentGenerator>) =
        match cfg.provider_mode {
            ProviderMode::Live => {
                let stripe_key = cfg.stripe_secret_key.clone().ok_or_else(|| {
                    anyhow::anyhow!("BILLWISE_STRIPE_SECRET_KEY required when BILLWISE_PROVIDERS=live")
                })?;
                let generation_key = cfg.generation_api_key.clone().ok_or_else(|| {
                    anyhow::anyhow!(
                        "BILLWISE_GENERATION_API_KEY required when BILLWISE_PROVIDERS=live"
                    )
                })?;
                info!(model = %cfg.generation_model, "Live providers: Stripe checkout + hosted generation");
                (
                    Arc::new(StripeCheckout::new(stripe_key)),
                    Arc::new(LlmGenerator::new(
                        generation_key,
                        cfg.generation_base_url.clone(),
                        cfg.generation_model.clone(),
                    )),
                )
            }
            ProviderMode::Mock => {
                tracing::warn!(
                    "Mock providers active — checkout URLs are not real payment sessions \
                     and premium plans are canned. Set BILLWISE_PROVIDERS=live for production."
                );
                (
                    Arc::new(MockCheckout::new()),
                    Arc::new(CannedGenerator::default()),
                )
            }
        };

    let state = Arc::new(AppState::new(cfg.clone(), checkout, generator));

    // Spawn the background session sweep task.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            state.run_session_sweep_loop().await;
        });
    }

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = billwise_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, mode = ?cfg.provider_mode, "Billwise listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
