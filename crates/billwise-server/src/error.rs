use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use billwise_core::error::{GateError, GenerationError};

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so Axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type. All gate and
/// provider failures are recoverable: the session's `GateState` is left in
/// its pre-call phase, so the client can simply retry.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// A gate operation was called in a phase where it is not allowed.
    #[error("invalid phase: {0}")]
    PhaseViolation(String),

    /// A success marker arrived while the session had no pending checkout.
    #[error("untrusted completion signal")]
    UntrustedSignal,

    /// Premium content requested while the gate is still locked.
    #[error("payment required")]
    PaymentRequired,

    /// The Checkout Provider rejected the session request.
    #[error("checkout session creation failed: {0}")]
    CheckoutFailed(String),

    /// The Content Generator failed or is rate-limited.
    #[error("content generation failed: {0}")]
    GenerationFailed(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::PhaseViolation { .. } => AppError::PhaseViolation(err.to_string()),
            GateError::UntrustedCompletionSignal { .. } => AppError::UntrustedSignal,
            GateError::Checkout(e) => AppError::CheckoutFailed(e.message),
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::GenerationFailed(err.message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::PhaseViolation(msg) => (StatusCode::CONFLICT, "invalid_phase", msg.clone()),
            AppError::UntrustedSignal => (
                StatusCode::FORBIDDEN,
                "untrusted_completion_signal",
                "Completion marker observed without a pending checkout — ignored".to_string(),
            ),
            AppError::PaymentRequired => (
                StatusCode::PAYMENT_REQUIRED,
                "payment_required",
                "Premium plan is locked. Complete checkout first.".to_string(),
            ),
            AppError::CheckoutFailed(msg) => {
                (StatusCode::BAD_GATEWAY, "checkout_creation_failed", msg.clone())
            }
            AppError::GenerationFailed(msg) => {
                (StatusCode::BAD_GATEWAY, "generation_failed", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": null
                }
            })),
        )
            .into_response()
    }
}
