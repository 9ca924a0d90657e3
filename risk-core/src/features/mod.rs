//! Features Module - request schema and validation
//!
//! The layout table is the single source of truth; the typed vector is
//! what the service hands to the model.

pub mod layout;
pub mod vector;


// Re-export common types
pub use layout::{
    FeatureKind, FeatureSpec, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
    layout_hash,
};
pub use vector::StudentFeatureVector;
