//! Error handling

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use dropout_risk_core::PredictionError;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Prediction errors
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    // Validation errors
    #[error("{0}")]
    ValidationError(String),

    // Optional collaborators not configured
    #[error("{0}")]
    ServiceUnavailable(String),

    // Database errors
    #[error("database error: {0}")]
    DatabaseError(String),

    // Generic errors
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Prediction(err) => {
                let status = match err {
                    PredictionError::MissingFeature { .. } | PredictionError::InvalidFeature { .. } => {
                        StatusCode::BAD_REQUEST
                    }
                    PredictionError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                    PredictionError::Inference(msg) => {
                        tracing::error!("Inference error: {}", msg);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };

                let body = Json(json!({
                    "error": err.to_string(),
                    "kind": err.kind(),
                    "fields": err.fields(),
                    "status": "error",
                    "code": status.as_u16()
                }));
                return (status, body).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred".to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": "error",
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Malformed bodies and wrong content types are client errors
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("worker task failed: {}", err))
    }
}
