//! Inference Engine - fitted model backends
//!
//! A model is loaded once, wrapped in a [`ModelHandle`] and shared read-only
//! by every request. Backends only produce class probabilities; shaping the
//! result happens in `prediction`.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::InferenceError;
use crate::features::{layout_hash, FEATURE_COUNT};
use crate::prediction::ClassDistribution;
use super::forest::RandomForest;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Which runtime evaluates the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackend {
    /// Forest evaluated natively from its JSON export
    Forest,
    /// Forest exported to ONNX, run through ONNX Runtime
    Onnx,
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub backend: ModelBackend,
    pub model_type: String,
    /// Number of trees, when the backend can tell
    pub n_estimators: Option<usize>,
    pub classes: Vec<String>,
    pub features: usize,
    pub layout_hash: u32,
    /// SHA-256 of the artifact bytes
    pub checksum: String,
    pub loaded_at: DateTime<Utc>,
}

impl ModelMetadata {
    pub(crate) fn new(
        model_path: impl Into<String>,
        backend: ModelBackend,
        n_estimators: Option<usize>,
        bytes: &[u8],
    ) -> Self {
        Self {
            model_path: model_path.into(),
            backend,
            model_type: "random_forest".to_string(),
            n_estimators,
            classes: crate::prediction::StudentOutcome::ALL
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            features: FEATURE_COUNT,
            layout_hash: layout_hash(),
            checksum: checksum(bytes),
            loaded_at: Utc::now(),
        }
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// A fitted three-class classifier over the student feature layout
pub trait Classifier: Send + Sync {
    /// Class probabilities in canonical order for one feature row
    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<ClassDistribution, InferenceError>;

    fn metadata(&self) -> &ModelMetadata;
}

/// Immutable shared model, constructed once at start-up
pub type ModelHandle = Arc<dyn Classifier>;

// ============================================================================
// LOADING
// ============================================================================

/// Hex SHA-256 of the artifact
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Load a model artifact, choosing the backend by extension
pub fn load_model(model_path: impl AsRef<Path>) -> Result<ModelHandle, InferenceError> {
    let path = model_path.as_ref();
    log::info!("Loading model from: {}", path.display());

    if !path.exists() {
        return Err(InferenceError::NotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let handle: ModelHandle = match extension.as_str() {
        "json" => {
            let bytes = std::fs::read(path)?;
            Arc::new(RandomForest::from_slice(&bytes, path.display().to_string())?)
        }
        #[cfg(feature = "onnx")]
        "onnx" => {
            let bytes = std::fs::read(path)?;
            Arc::new(super::onnx::OnnxForest::from_bytes(&bytes, path.display().to_string())?)
        }
        #[cfg(not(feature = "onnx"))]
        "onnx" => {
            return Err(InferenceError::Unsupported(
                "ONNX models require the `onnx` feature".to_string(),
            ))
        }
        other => {
            return Err(InferenceError::Unsupported(format!(
                "unknown model extension '{}'",
                other
            )))
        }
    };

    let meta = handle.metadata();
    log::info!(
        "Model loaded: backend={:?}, trees={:?}, sha256={}",
        meta.backend,
        meta.n_estimators,
        &meta.checksum[..12]
    );

    Ok(handle)
}
