//! Student Feature Vector - typed classifier input
//!
//! Raw payloads are flat JSON maps keyed by the request names in
//! [`FEATURE_LAYOUT`]. Parsing checks presence first (reporting every
//! absent field), then value kinds (reporting the first bad field).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::layout::{FeatureKind, FeatureSpec, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::error::PredictionError;

/// One student, as the fitted model sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentFeatureVector {
    pub marital_status: u32,
    pub application_mode: u32,
    pub course: u32,
    pub daytime_evening_attendance: u32,
    pub previous_qualification: u32,
    pub nationality: u32,
    pub mother_qualification: u32,
    pub father_qualification: u32,
    pub mother_occupation: u32,
    pub father_occupation: u32,
    pub displaced: u32,
    pub educational_special_needs: u32,
    pub debtor: u32,
    pub tuition_fees_up_to_date: u32,
    pub gender: u32,
    pub scholarship_holder: u32,
    pub age_at_enrollment: u32,
    pub international: u32,
    pub curricular_units_1st_sem_credited: u32,
    pub curricular_units_1st_sem_enrolled: u32,
    pub curricular_units_1st_sem_evaluations: u32,
    pub curricular_units_1st_sem_approved: u32,
    pub curricular_units_1st_sem_grade: f64,
    pub curricular_units_2nd_sem_credited: u32,
    pub curricular_units_2nd_sem_enrolled: u32,
    pub curricular_units_2nd_sem_evaluations: u32,
    pub curricular_units_2nd_sem_approved: u32,
    pub curricular_units_2nd_sem_grade: f64,
    pub unemployment_rate: f64,
    pub inflation_rate: f64,
    pub gdp: f64,
}

impl StudentFeatureVector {
    /// Validate a raw payload. Anything other than a JSON object is
    /// treated as a payload with every feature missing.
    pub fn from_json(value: &Value) -> Result<Self, PredictionError> {
        match value.as_object() {
            Some(map) => Self::from_map(map),
            None => Err(PredictionError::MissingFeature {
                fields: FEATURE_LAYOUT.iter().map(|s| s.name.to_string()).collect(),
            }),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Result<Self, PredictionError> {
        let missing: Vec<String> = FEATURE_LAYOUT
            .iter()
            .filter(|spec| !map.contains_key(spec.name))
            .map(|spec| spec.name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(PredictionError::MissingFeature { fields: missing });
        }

        let mut values = [0.0f64; FEATURE_COUNT];
        for (slot, spec) in values.iter_mut().zip(FEATURE_LAYOUT.iter()) {
            *slot = parse_value(spec, &map[spec.name])?;
        }

        Ok(Self::from_validated(&values))
    }

    /// Build from values already checked against their [`FeatureKind`]
    fn from_validated(v: &[f64; FEATURE_COUNT]) -> Self {
        let n = |i: usize| v[i] as u32;
        Self {
            marital_status: n(0),
            application_mode: n(1),
            course: n(2),
            daytime_evening_attendance: n(3),
            previous_qualification: n(4),
            nationality: n(5),
            mother_qualification: n(6),
            father_qualification: n(7),
            mother_occupation: n(8),
            father_occupation: n(9),
            displaced: n(10),
            educational_special_needs: n(11),
            debtor: n(12),
            tuition_fees_up_to_date: n(13),
            gender: n(14),
            scholarship_holder: n(15),
            age_at_enrollment: n(16),
            international: n(17),
            curricular_units_1st_sem_credited: n(18),
            curricular_units_1st_sem_enrolled: n(19),
            curricular_units_1st_sem_evaluations: n(20),
            curricular_units_1st_sem_approved: n(21),
            curricular_units_1st_sem_grade: v[22],
            curricular_units_2nd_sem_credited: n(23),
            curricular_units_2nd_sem_enrolled: n(24),
            curricular_units_2nd_sem_evaluations: n(25),
            curricular_units_2nd_sem_approved: n(26),
            curricular_units_2nd_sem_grade: v[27],
            unemployment_rate: v[28],
            inflation_rate: v[29],
            gdp: v[30],
        }
    }

    /// Values in layout order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.marital_status as f64,
            self.application_mode as f64,
            self.course as f64,
            self.daytime_evening_attendance as f64,
            self.previous_qualification as f64,
            self.nationality as f64,
            self.mother_qualification as f64,
            self.father_qualification as f64,
            self.mother_occupation as f64,
            self.father_occupation as f64,
            self.displaced as f64,
            self.educational_special_needs as f64,
            self.debtor as f64,
            self.tuition_fees_up_to_date as f64,
            self.gender as f64,
            self.scholarship_holder as f64,
            self.age_at_enrollment as f64,
            self.international as f64,
            self.curricular_units_1st_sem_credited as f64,
            self.curricular_units_1st_sem_enrolled as f64,
            self.curricular_units_1st_sem_evaluations as f64,
            self.curricular_units_1st_sem_approved as f64,
            self.curricular_units_1st_sem_grade,
            self.curricular_units_2nd_sem_credited as f64,
            self.curricular_units_2nd_sem_enrolled as f64,
            self.curricular_units_2nd_sem_evaluations as f64,
            self.curricular_units_2nd_sem_approved as f64,
            self.curricular_units_2nd_sem_grade,
            self.unemployment_rate,
            self.inflation_rate,
            self.gdp,
        ]
    }

    /// A complete, valid first-year student used as a request template
    pub fn example() -> Self {
        Self {
            marital_status: 1,
            application_mode: 1,
            course: 1,
            daytime_evening_attendance: 1,
            previous_qualification: 1,
            nationality: 1,
            mother_qualification: 1,
            father_qualification: 1,
            mother_occupation: 1,
            father_occupation: 1,
            displaced: 0,
            educational_special_needs: 0,
            debtor: 0,
            tuition_fees_up_to_date: 1,
            gender: 1,
            scholarship_holder: 0,
            age_at_enrollment: 20,
            international: 0,
            curricular_units_1st_sem_credited: 0,
            curricular_units_1st_sem_enrolled: 0,
            curricular_units_1st_sem_evaluations: 0,
            curricular_units_1st_sem_approved: 0,
            curricular_units_1st_sem_grade: 0.0,
            curricular_units_2nd_sem_credited: 0,
            curricular_units_2nd_sem_enrolled: 0,
            curricular_units_2nd_sem_evaluations: 0,
            curricular_units_2nd_sem_approved: 0,
            curricular_units_2nd_sem_grade: 0.0,
            unemployment_rate: 10.8,
            inflation_rate: 1.4,
            gdp: 1.74,
        }
    }

    /// Flat JSON map keyed by request names, the inverse of [`Self::from_json`]
    pub fn to_json(&self) -> Value {
        let values = self.to_array();
        let map: Map<String, Value> = FEATURE_LAYOUT
            .iter()
            .zip(values.iter())
            .map(|(spec, v)| {
                let value = match spec.kind {
                    FeatureKind::Integer => Value::from(*v as u32),
                    FeatureKind::Real => Value::from(*v),
                };
                (spec.name.to_string(), value)
            })
            .collect();
        Value::Object(map)
    }

    /// Get feature by request name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).map(|i| self.to_array()[i])
    }
}

fn parse_value(spec: &FeatureSpec, value: &Value) -> Result<f64, PredictionError> {
    let invalid = |reason: &str| PredictionError::InvalidFeature {
        field: spec.name.to_string(),
        reason: reason.to_string(),
    };

    let number = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid("number out of range"))?,
        Value::Null => return Err(invalid("expected a number, got null")),
        Value::Bool(_) => return Err(invalid("expected a number, got a boolean")),
        Value::String(_) => return Err(invalid("expected a number, got a string")),
        Value::Array(_) | Value::Object(_) => return Err(invalid("expected a number")),
    };

    if !number.is_finite() {
        return Err(invalid("number must be finite"));
    }

    match spec.kind {
        FeatureKind::Real => Ok(number),
        FeatureKind::Integer => {
            if number.fract() != 0.0 {
                Err(invalid("expected a whole number"))
            } else if number < 0.0 || number > u32::MAX as f64 {
                Err(invalid("expected a non-negative whole number"))
            } else {
                Ok(number)
            }
        }
    }
}
