use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::{error::AppError, sessions::SessionId, state::AppState};

/// `POST /api/premium` — the gated content.
///
/// 402 until the gate reports unlocked; then builds the premium prompt from
/// the session's stored profile and calls the Content Generator. Generator
/// failure surfaces as 502 `generation_failed` with gate state untouched,
/// so the client can simply re-request.
#[tracing::instrument(skip(state))]
pub async fn premium(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(sid)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    // Snapshot what we need, then release the session before the slow call.
    let prompt = {
        let slot = state.session(&sid).await;
        let mut session = slot.lock().await;
        session.touch();
        if !session.gate.is_unlocked() {
            return Err(AppError::PaymentRequired);
        }
        session
            .profile
            .as_ref()
            .ok_or_else(|| {
                AppError::BadRequest("no estimate submitted for this session".to_string())
            })?
            .premium_prompt()
    };

    let plan = state
        .generator
        .generate(&prompt, state.config.generation_max_tokens)
        .await?;

    Ok(Json(json!({ "plan": plan })))
}
