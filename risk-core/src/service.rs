//! Risk Classification Service
//!
//! Stateless front door to the fitted model. Holds the shared model handle
//! (or nothing, when loading failed at start-up) and applies the same
//! validate → score → tier pipeline to single and batch requests.

use serde_json::Value;

use crate::error::PredictionError;
use crate::features::StudentFeatureVector;
use crate::model::{ModelHandle, ModelMetadata};
use crate::prediction::{BatchEntry, BatchResult, PredictionResult};

#[derive(Clone)]
pub struct RiskClassifier {
    model: Option<ModelHandle>,
}

impl RiskClassifier {
    pub fn new(model: ModelHandle) -> Self {
        Self { model: Some(model) }
    }

    /// A service with no model; every prediction reports `ModelUnavailable`
    pub fn unavailable() -> Self {
        Self { model: None }
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.model.as_ref().map(|m| m.metadata())
    }

    /// Score an already validated vector
    pub fn classify(&self, vector: &StudentFeatureVector) -> Result<PredictionResult, PredictionError> {
        let model = self.model.as_ref().ok_or(PredictionError::ModelUnavailable)?;

        let distribution = model.predict_proba(&vector.to_array())?;
        let result = PredictionResult::from_distribution(distribution)?;

        log::debug!(
            "Predicted {} (dropout={:.3}, risk={})",
            result.prediction,
            result.dropout_probability(),
            result.risk_level
        );

        Ok(result)
    }

    /// Validate a raw payload and score it.
    /// Model availability is checked before the payload.
    pub fn predict(&self, payload: &Value) -> Result<PredictionResult, PredictionError> {
        if !self.is_ready() {
            return Err(PredictionError::ModelUnavailable);
        }

        let vector = StudentFeatureVector::from_json(payload)?;
        self.classify(&vector)
    }

    /// Score every entry independently, preserving order and indices
    pub fn predict_batch(&self, payloads: &[Value]) -> BatchResult {
        let entries: Vec<BatchEntry> = payloads
            .iter()
            .enumerate()
            .map(|(index, payload)| BatchEntry {
                index,
                outcome: self.predict(payload),
            })
            .collect();

        let batch = BatchResult::from_entries(entries);
        log::debug!(
            "Batch scored: total={}, succeeded={}, failed={}",
            batch.total,
            batch.succeeded,
            batch.failed
        );
        batch
    }
}

impl std::fmt::Debug for RiskClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskClassifier")
            .field("model", &self.metadata().map(|m| &m.model_path))
            .finish()
    }
}
