//! Service info, health and schema handlers

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use dropout_risk_core::features::{LayoutInfo, FEATURE_LAYOUT};
use dropout_risk_core::{ModelMetadata, PredictionError, StudentFeatureVector};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{AppResult, AppState};

#[derive(Serialize)]
pub struct ServiceInfo {
    message: &'static str,
    version: &'static str,
    endpoints: BTreeMap<&'static str, &'static str>,
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Student Dropout Prediction API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: BTreeMap::from([
            ("GET /health", "Health check"),
            ("GET /features", "Required features list"),
            ("GET /model", "Loaded model metadata"),
            ("POST /predict", "Predict student dropout risk"),
            ("POST /predict_batch", "Predict dropout risk for a list of students"),
            ("POST /api/v1/students/high-risk", "Save a high-risk student"),
            ("GET /api/v1/students/high-risk", "List saved high-risk students"),
            ("GET /api/v1/reports/high-risk-summary", "High-risk registry summary"),
            ("POST /api/v1/students/:student_id/moods", "Record a mood entry"),
            ("GET /api/v1/students/:student_id/moods", "Recent mood entries for a student"),
        ]),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    persistence_enabled: bool,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.classifier.is_ready(),
        persistence_enabled: state.pool.is_some(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

#[derive(Serialize)]
pub struct FeaturesResponse {
    features: Vec<&'static str>,
    feature_descriptions: Map<String, Value>,
    layout: LayoutInfo,
    example: Value,
}

pub async fn features() -> Json<FeaturesResponse> {
    let feature_descriptions = FEATURE_LAYOUT
        .iter()
        .map(|spec| (spec.name.to_string(), Value::from(spec.column)))
        .collect();

    Json(FeaturesResponse {
        features: FEATURE_LAYOUT.iter().map(|spec| spec.name).collect(),
        feature_descriptions,
        layout: LayoutInfo::current(),
        example: StudentFeatureVector::example().to_json(),
    })
}

pub async fn model_info(State(state): State<AppState>) -> AppResult<Json<ModelMetadata>> {
    let metadata = state
        .classifier
        .metadata()
        .cloned()
        .ok_or(PredictionError::ModelUnavailable)?;

    Ok(Json(metadata))
}
