use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// `GET /health` — liveness check.
///
/// All state is in-memory, so reachability of the process is the whole
/// check. Reports the active session count for operational visibility.
///
/// Response shape:
/// ```json
/// { "status": "ok", "version": "0.1.0", "sessions": 3 }
/// ```
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sessions = state.session_count().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "sessions": sessions
        })),
    )
}
