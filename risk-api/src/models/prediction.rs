//! Prediction wire formats

use dropout_risk_core::{BatchEntry, BatchResult, PredictionResult};
use serde::Serialize;
use serde_json::Value;

use crate::AppError;

/// Successful single prediction
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub status: &'static str,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self { result, status: "success" }
    }
}

/// Pull the `students` list out of a batch body
pub fn batch_students(body: Value) -> Result<Vec<Value>, AppError> {
    match body {
        Value::Object(mut map) => match map.remove("students") {
            Some(Value::Array(students)) => Ok(students),
            Some(_) => Err(AppError::ValidationError("Students data must be a list".to_string())),
            None => Err(AppError::ValidationError("No students data provided".to_string())),
        },
        _ => Err(AppError::ValidationError("No students data provided".to_string())),
    }
}

/// One entry of a batch response
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchItem {
    Success {
        index: usize,
        #[serde(flatten)]
        result: PredictionResult,
        status: &'static str,
    },
    Failure {
        index: usize,
        error: String,
        kind: &'static str,
        fields: Vec<String>,
        status: &'static str,
    },
}

impl From<BatchEntry> for BatchItem {
    fn from(entry: BatchEntry) -> Self {
        match entry.outcome {
            Ok(result) => BatchItem::Success {
                index: entry.index,
                result,
                status: "success",
            },
            Err(err) => BatchItem::Failure {
                index: entry.index,
                error: err.to_string(),
                kind: err.kind(),
                fields: err.fields().into_iter().map(str::to_string).collect(),
                status: "error",
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub status: &'static str,
}

impl From<BatchResult> for BatchResponse {
    fn from(batch: BatchResult) -> Self {
        Self {
            total_processed: batch.total,
            successful: batch.succeeded,
            failed: batch.failed,
            results: batch.entries.into_iter().map(BatchItem::from).collect(),
            status: "success",
        }
    }
}
