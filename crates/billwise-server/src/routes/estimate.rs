use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use billwise_core::estimate::{SavingsProfile, DEFAULT_ANNUAL_RETURN, PROJECTION_HORIZONS_YEARS};

use crate::{error::AppError, sessions::SessionId, state::AppState};

/// `POST /api/estimate` — the free tier.
///
/// Validates the calculator inputs, stores them on the session (the premium
/// prompt is built from them later), and returns the deterministic teaser:
/// estimated monthly savings plus 5- and 10-year projection series for the
/// chart. No external collaborator is involved — the Content Generator is
/// reserved for unlocked sessions.
#[tracing::instrument(skip(state, profile))]
pub async fn estimate(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(sid)): Extension<SessionId>,
    Json(profile): Json<SavingsProfile>,
) -> Result<impl IntoResponse, AppError> {
    profile.validate().map_err(AppError::BadRequest)?;

    let monthly_savings = profile.monthly_savings();
    let [short_horizon, long_horizon] = PROJECTION_HORIZONS_YEARS;
    let five_year = profile.projection(short_horizon, DEFAULT_ANNUAL_RETURN);
    let ten_year = profile.projection(long_horizon, DEFAULT_ANNUAL_RETURN);

    {
        let slot = state.session(&sid).await;
        let mut session = slot.lock().await;
        session.touch();
        session.profile = Some(profile);
    }

    Ok(Json(json!({
        "currency": state.config.currency,
        "monthly_savings": monthly_savings,
        "assumed_annual_return": DEFAULT_ANNUAL_RETURN,
        "projections": {
            "five_year": five_year,
            "ten_year": ten_year
        }
    })))
}
