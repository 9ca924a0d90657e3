//! Error types for validation, scoring and model loading

use thiserror::Error;

/// Reasons a single prediction can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// One or more required features are absent, in layout order
    #[error("Missing required features: {fields:?}")]
    MissingFeature { fields: Vec<String> },

    /// A feature is present but not an acceptable number
    #[error("Invalid value for feature '{field}': {reason}")]
    InvalidFeature { field: String, reason: String },

    #[error("Model not loaded")]
    ModelUnavailable,

    /// The backend failed or produced an unusable distribution
    #[error("Prediction failed: {0}")]
    Inference(String),
}

impl PredictionError {
    /// Stable identifier for clients
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::MissingFeature { .. } => "missing_feature",
            PredictionError::InvalidFeature { .. } => "invalid_feature",
            PredictionError::ModelUnavailable => "model_unavailable",
            PredictionError::Inference(_) => "inference",
        }
    }

    /// Feature names the error refers to, if any
    pub fn fields(&self) -> Vec<&str> {
        match self {
            PredictionError::MissingFeature { fields } => fields.iter().map(String::as_str).collect(),
            PredictionError::InvalidFeature { field, .. } => vec![field.as_str()],
            _ => Vec::new(),
        }
    }

    /// Caller-side problem (bad input) rather than a service fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictionError::MissingFeature { .. } | PredictionError::InvalidFeature { .. }
        )
    }
}

/// Failure to load or run a fitted model
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed model artifact: {0}")]
    Format(String),

    #[error("Unsupported model format: {0}")]
    Unsupported(String),

    #[error("Inference failed: {0}")]
    Runtime(String),
}

impl From<serde_json::Error> for InferenceError {
    fn from(err: serde_json::Error) -> Self {
        InferenceError::Format(err.to_string())
    }
}

impl From<InferenceError> for PredictionError {
    fn from(err: InferenceError) -> Self {
        PredictionError::Inference(err.to_string())
    }
}
