//! Data models

pub mod prediction;
pub mod high_risk;
pub mod mood;

pub use prediction::*;
pub use high_risk::*;
pub use mood::*;
