//! High-risk student registry handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use dropout_risk_core::model::threshold::{should_persist, PERSIST_THRESHOLD};
use dropout_risk_core::RiskLevel;
use validator::Validate;

use crate::{AppState, AppError, AppResult};
use crate::models::{DeleteResponse, HighRiskFilter, HighRiskStudent, SaveHighRiskRequest};

/// Re-score a student and store the record if it is high risk
pub async fn save(
    State(state): State<AppState>,
    req: Result<Json<SaveHighRiskRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<HighRiskStudent>)> {
    let Json(req) = req?;
    req.validate()?;
    let pool = state.db()?;

    let result = state.score(req.features.clone()).await?;
    if !should_persist(result.dropout_probability()) {
        return Err(AppError::ValidationError(format!(
            "Dropout probability {:.2} is below the high-risk threshold {:.2}",
            result.dropout_probability(),
            PERSIST_THRESHOLD
        )));
    }

    let record = HighRiskStudent::create(pool, &req.student_id, &req.features, &result).await?;

    tracing::info!(
        "High-risk student saved: {} (dropout={:.3}, id={})",
        record.student_id, record.dropout_probability, record.id
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// List saved high-risk students, newest first
pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<HighRiskFilter>, QueryRejection>,
) -> AppResult<Json<Vec<HighRiskStudent>>> {
    let Query(filter) = filter?;
    let pool = state.db()?;

    if let Some(level) = filter.risk_level.as_deref() {
        if RiskLevel::parse(level).is_none() {
            return Err(AppError::ValidationError(format!("Unknown risk level '{}'", level)));
        }
    }
    if let Some(p) = filter.min_probability {
        if !(0.0..=1.0).contains(&p) {
            return Err(AppError::ValidationError(
                "min_probability must be between 0 and 1".to_string(),
            ));
        }
    }

    let students = HighRiskStudent::list(pool, &filter).await?;
    Ok(Json(students))
}

/// Latest record for one student
pub async fn get(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> AppResult<Json<HighRiskStudent>> {
    let pool = state.db()?;

    let student = HighRiskStudent::find_latest(pool, &student_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    Ok(Json(student))
}

/// Remove every record
pub async fn delete_all(State(state): State<AppState>) -> AppResult<Json<DeleteResponse>> {
    let pool = state.db()?;

    let deleted_count = HighRiskStudent::delete_all(pool).await?;
    tracing::warn!("High-risk registry cleared: {} records deleted", deleted_count);

    Ok(Json(DeleteResponse { deleted_count }))
}
