//! Prediction handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use dropout_risk_core::PredictionError;
use serde_json::Value;

use crate::{AppState, AppError, AppResult};
use crate::models::{batch_students, BatchResponse, PredictionResponse};

/// Single prediction
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let Json(payload) = payload?;
    let result = state.score(payload).await?;

    tracing::debug!(
        "Prediction: {} (risk={}, confidence={:.3})",
        result.prediction, result.risk_level, result.confidence
    );

    Ok(Json(result.into()))
}

/// Batch prediction
pub async fn predict_batch(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<BatchResponse>> {
    let Json(body) = body?;
    if !state.classifier.is_ready() {
        return Err(PredictionError::ModelUnavailable.into());
    }

    let students = batch_students(body)?;
    if students.len() > state.config.max_batch_size {
        return Err(AppError::ValidationError(format!(
            "Batch of {} students exceeds the limit of {}",
            students.len(),
            state.config.max_batch_size
        )));
    }

    let classifier = state.classifier.clone();
    let batch = tokio::task::spawn_blocking(move || classifier.predict_batch(&students)).await?;

    if batch.failed > 0 {
        tracing::warn!("Batch prediction: {} of {} entries failed", batch.failed, batch.total);
    } else {
        tracing::info!("Batch prediction: {} entries scored", batch.total);
    }

    Ok(Json(batch.into()))
}
