//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema the fitted model was trained on.**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Rename a request field or column → increment FEATURE_VERSION
//!
//! The column names are the dataset headers the forest was fitted against,
//! including the dataset's own spelling (`Nacionality`).

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// How a raw value must look to be accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Categorical code or count: non-negative whole number
    Integer,
    /// Grade, rate or macroeconomic indicator: any finite number
    Real,
}

/// One entry of the layout
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    /// Field name in request payloads
    pub name: &'static str,
    /// Column name in the training dataset
    pub column: &'static str,
    pub kind: FeatureKind,
}

const fn int(name: &'static str, column: &'static str) -> FeatureSpec {
    FeatureSpec { name, column, kind: FeatureKind::Integer }
}

const fn real(name: &'static str, column: &'static str) -> FeatureSpec {
    FeatureSpec { name, column, kind: FeatureKind::Real }
}

/// Features in the exact order the model consumes them
pub const FEATURE_LAYOUT: [FeatureSpec; FEATURE_COUNT] = [
    // === Demographic & application (0-17) ===
    int("marital_status", "Marital status"),                           // 0
    int("application_mode", "Application mode"),                       // 1
    int("course", "Course"),                                           // 2
    int("daytime_evening_attendance", "Daytime/evening attendance"),   // 3
    int("previous_qualification", "Previous qualification"),           // 4
    int("nationality", "Nacionality"),                                 // 5
    int("mother_qualification", "Mother's qualification"),             // 6
    int("father_qualification", "Father's qualification"),             // 7
    int("mother_occupation", "Mother's occupation"),                   // 8
    int("father_occupation", "Father's occupation"),                   // 9
    int("displaced", "Displaced"),                                     // 10
    int("educational_special_needs", "Educational special needs"),     // 11
    int("debtor", "Debtor"),                                           // 12
    int("tuition_fees_up_to_date", "Tuition fees up to date"),         // 13
    int("gender", "Gender"),                                           // 14
    int("scholarship_holder", "Scholarship holder"),                   // 15
    int("age_at_enrollment", "Age at enrollment"),                     // 16
    int("international", "International"),                             // 17

    // === Academic, 1st semester (18-22) ===
    int("curricular_units_1st_sem_credited", "Curricular units 1st sem (credited)"),
    int("curricular_units_1st_sem_enrolled", "Curricular units 1st sem (enrolled)"),
    int("curricular_units_1st_sem_evaluations", "Curricular units 1st sem (evaluations)"),
    int("curricular_units_1st_sem_approved", "Curricular units 1st sem (approved)"),
    real("curricular_units_1st_sem_grade", "Curricular units 1st sem (grade)"),

    // === Academic, 2nd semester (23-27) ===
    int("curricular_units_2nd_sem_credited", "Curricular units 2nd sem (credited)"),
    int("curricular_units_2nd_sem_enrolled", "Curricular units 2nd sem (enrolled)"),
    int("curricular_units_2nd_sem_evaluations", "Curricular units 2nd sem (evaluations)"),
    int("curricular_units_2nd_sem_approved", "Curricular units 2nd sem (approved)"),
    real("curricular_units_2nd_sem_grade", "Curricular units 2nd sem (grade)"),

    // === Macroeconomic (28-30) ===
    real("unemployment_rate", "Unemployment rate"),
    real("inflation_rate", "Inflation rate"),
    real("gdp", "GDP"),
];

/// Total number of features
pub const FEATURE_COUNT: usize = 31;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over version, request names and column names, in order
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for spec in FEATURE_LAYOUT.iter() {
        hasher.update(spec.name.as_bytes());
        hasher.update(&[0]);
        hasher.update(spec.column.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout description served to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
    pub column_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.name.to_string()).collect(),
            column_names: FEATURE_LAYOUT.iter().map(|s| s.column.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Index of a request field name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|s| s.name == name)
}

/// Index of a dataset column name
pub fn column_index(column: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|s| s.column == column)
}

pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).map(|s| s.name)
}

/// True when `names` lists every column in layout order
pub fn matches_columns<S: AsRef<str>>(names: &[S]) -> bool {
    names.len() == FEATURE_COUNT
        && names
            .iter()
            .zip(FEATURE_LAYOUT.iter())
            .all(|(n, spec)| n.as_ref() == spec.column)
}

// ============================================================================
// TESTS
// ============================================================================
