//! Student Dropout Risk - Classification Core
//!
//! Turns a 31-field student description into class probabilities over
//! {Dropout, Enrolled, Graduate} and a Low/Medium/High risk tier.
//!
//! # Pipeline
//!
//! ```text
//! JSON payload ──► StudentFeatureVector ──► Classifier ──► ClassDistribution
//!   (features)        (validation)           (model)           │
//!                                                               ▼
//!                                      PredictionResult ◄── argmax + tier
//! ```
//!
//! The fitted model is loaded once into a [`ModelHandle`] and shared
//! read-only; nothing here mutates state after start-up.

pub mod error;
pub mod features;
pub mod model;
pub mod prediction;
pub mod service;

pub use error::{InferenceError, PredictionError};
pub use features::{StudentFeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};
pub use model::{load_model, Classifier, ModelHandle, ModelMetadata, RiskLevel};
pub use prediction::{BatchEntry, BatchResult, PredictionResult, Probabilities, StudentOutcome};
pub use service::RiskClassifier;
