//! Reports handlers

use axum::{extract::State, Json};

use crate::{AppState, AppResult};
use crate::models::{HighRiskStudent, HighRiskSummary};

/// Registry totals and urgency breakdown
pub async fn high_risk_summary(State(state): State<AppState>) -> AppResult<Json<HighRiskSummary>> {
    let pool = state.db()?;
    let summary = HighRiskStudent::summary(pool).await?;
    Ok(Json(summary))
}
