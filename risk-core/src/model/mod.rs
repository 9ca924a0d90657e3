//! Model Module - fitted classifier backends and risk thresholds

pub mod forest;
pub mod inference;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod threshold;

// Re-export common types
pub use forest::{ForestArtifact, RandomForest, TreeArtifact};
pub use inference::{checksum, load_model, Classifier, ModelBackend, ModelHandle, ModelMetadata};
pub use threshold::{InterventionUrgency, RiskLevel, UrgencyBreakdown};
