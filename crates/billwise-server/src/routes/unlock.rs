use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use url::Url;

use billwise_core::{checkout::CheckoutRequest, config::Config, signal::CompletionSignal};

use crate::{error::AppError, sessions::SessionId, state::AppState};

/// `GET /api/unlock` — render-time query: current phase and visibility.
#[tracing::instrument(skip(state))]
pub async fn status(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(sid)): Extension<SessionId>,
) -> impl IntoResponse {
    let slot = state.session(&sid).await;
    let mut session = slot.lock().await;
    session.touch();
    Json(json!({
        "phase": session.gate.phase(),
        "unlocked": session.gate.is_unlocked()
    }))
}

/// `POST /api/unlock/request` — the user asked to see the premium offer.
#[tracing::instrument(skip(state))]
pub async fn request(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(sid)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let slot = state.session(&sid).await;
    let mut session = slot.lock().await;
    session.touch();
    session.gate.request_unlock()?;
    Ok(Json(json!({ "phase": session.gate.phase() })))
}

/// `POST /api/unlock/decline` — the user opted out at the confirmation step.
#[tracing::instrument(skip(state))]
pub async fn decline(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(sid)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let slot = state.session(&sid).await;
    let mut session = slot.lock().await;
    session.touch();
    session.gate.decline()?;
    Ok(Json(json!({ "phase": session.gate.phase() })))
}

/// `POST /api/unlock/confirm` — create the payment session.
///
/// Price, currency and product name come from config; redirects are derived
/// from the public URL. On provider failure the gate stays in `Requested`
/// and the client receives 502 `checkout_creation_failed` with the
/// provider's message — retrying the same call is always safe.
#[tracing::instrument(skip(state))]
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(sid)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let request = checkout_request(&state.config)?;

    // Only this session's lock is held across the provider call, so its own
    // transitions stay serialised while other sessions proceed untouched.
    let slot = state.session(&sid).await;
    let mut session = slot.lock().await;
    session.touch();
    let checkout_url = session
        .gate
        .confirm_and_pay(state.checkout.as_ref(), &request)
        .await?;

    Ok(Json(json!({
        "phase": session.gate.phase(),
        "checkout_url": checkout_url
    })))
}

/// `GET /api/unlock/complete` — observe the completion signal.
///
/// Called with the query parameters of the post-checkout redirect. A
/// success marker without a pending checkout (forged or replayed link)
/// returns 403 `untrusted_completion_signal` and changes nothing.
#[tracing::instrument(skip(state, params))]
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(sid)): Extension<SessionId>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let signal = CompletionSignal::from_pairs(params);

    let slot = state.session(&sid).await;
    let mut session = slot.lock().await;
    session.touch();
    let unlocked = session.gate.observe_completion_signal(&signal)?;
    if unlocked {
        tracing::info!(phase = ?session.gate.phase(), "Premium content unlocked");
    }
    Ok(Json(json!({
        "phase": session.gate.phase(),
        "unlocked": unlocked
    })))
}

/// `POST /api/unlock/reset` — "start over": force the gate back to idle.
#[tracing::instrument(skip(state))]
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(sid)): Extension<SessionId>,
) -> impl IntoResponse {
    let slot = state.session(&sid).await;
    let mut session = slot.lock().await;
    session.touch();
    session.gate.reset();
    Json(json!({ "phase": session.gate.phase() }))
}

/// Build the provider request from config. The success redirect carries the
/// canonical `payment=success` marker the gate later looks for.
fn checkout_request(config: &Config) -> Result<CheckoutRequest, AppError> {
    let base = config.public_url.trim_end_matches('/');
    let parse = |suffix: &str| {
        Url::parse(&format!("{base}/{suffix}"))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid public_url: {e}")))
    };
    Ok(CheckoutRequest {
        amount_minor_units: config.premium_price_cents,
        currency: config.currency.clone(),
        product_name: config.product_name.clone(),
        success_redirect: parse("?payment=success")?,
        cancel_redirect: parse("?payment=cancel")?,
    })
}
