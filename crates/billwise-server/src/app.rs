use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, sessions, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware, outer to inner:
///
/// 1. `TraceLayer` — structured request/response logging via `tracing`.
/// 2. `CorsLayer` — permissive; the calculator form may be embedded.
/// 3. `ensure_session` — every request carries a session ID cookie, and
///    with it ownership of exactly one `GateState`.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/estimate", post(routes::estimate::estimate))
        .route("/api/unlock", get(routes::unlock::status))
        .route("/api/unlock/request", post(routes::unlock::request))
        .route("/api/unlock/decline", post(routes::unlock::decline))
        .route("/api/unlock/confirm", post(routes::unlock::confirm))
        .route("/api/unlock/complete", get(routes::unlock::complete))
        .route("/api/unlock/reset", post(routes::unlock::reset))
        .route("/api/premium", post(routes::premium::premium))
        .layer(middleware::from_fn(sessions::ensure_session))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
