//! Prediction results
//!
//! Class probabilities come out of a model as a [`ClassDistribution`] and are
//! shaped into a [`PredictionResult`] here, so every backend shares the same
//! argmax, tie-break and tiering rules.

use serde::{Deserialize, Serialize};

use crate::error::PredictionError;
use crate::model::threshold::RiskLevel;

/// Absolute tolerance on the probability sum before renormalising
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Student outcome classes, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StudentOutcome {
    Dropout,
    Enrolled,
    Graduate,
}

impl StudentOutcome {
    /// Canonical order; also the tie-break order
    pub const ALL: [StudentOutcome; 3] = [
        StudentOutcome::Dropout,
        StudentOutcome::Enrolled,
        StudentOutcome::Graduate,
    ];

    pub fn index(&self) -> usize {
        match self {
            StudentOutcome::Dropout => 0,
            StudentOutcome::Enrolled => 1,
            StudentOutcome::Graduate => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentOutcome::Dropout => "Dropout",
            StudentOutcome::Enrolled => "Enrolled",
            StudentOutcome::Graduate => "Graduate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl std::fmt::Display for StudentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw class probabilities in canonical order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDistribution(pub [f64; 3]);

impl ClassDistribution {
    pub fn get(&self, class: StudentOutcome) -> f64 {
        self.0[class.index()]
    }

    /// Check for negative, non-finite or all-zero mass and renormalise
    /// when the sum drifts beyond [`SUM_TOLERANCE`].
    pub fn normalized(self) -> Result<Self, PredictionError> {
        if self.0.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(PredictionError::Inference(format!(
                "model returned invalid probabilities {:?}",
                self.0
            )));
        }

        let sum: f64 = self.0.iter().sum();
        if sum <= 0.0 {
            return Err(PredictionError::Inference(
                "model returned an empty distribution".to_string(),
            ));
        }

        if (sum - 1.0).abs() <= SUM_TOLERANCE {
            return Ok(self);
        }

        Ok(Self(self.0.map(|p| p / sum)))
    }

    /// Class with the highest probability; the earliest class wins ties
    pub fn argmax(&self) -> StudentOutcome {
        let mut best = StudentOutcome::Dropout;
        for class in StudentOutcome::ALL.into_iter().skip(1) {
            if self.get(class) > self.get(best) {
                best = class;
            }
        }
        best
    }
}

/// Probability mapping with exactly the three outcome keys
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    #[serde(rename = "Dropout")]
    pub dropout: f64,
    #[serde(rename = "Enrolled")]
    pub enrolled: f64,
    #[serde(rename = "Graduate")]
    pub graduate: f64,
}

impl From<ClassDistribution> for Probabilities {
    fn from(dist: ClassDistribution) -> Self {
        let [dropout, enrolled, graduate] = dist.0;
        Self { dropout, enrolled, graduate }
    }
}

impl Probabilities {
    pub fn sum(&self) -> f64 {
        self.dropout + self.enrolled + self.graduate
    }
}

/// Outcome of one successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: StudentOutcome,
    pub probabilities: Probabilities,
    pub risk_level: RiskLevel,
    /// Probability of the predicted class
    pub confidence: f64,
}

impl PredictionResult {
    pub fn from_distribution(dist: ClassDistribution) -> Result<Self, PredictionError> {
        let dist = dist.normalized()?;
        let prediction = dist.argmax();

        Ok(Self {
            prediction,
            probabilities: dist.into(),
            risk_level: RiskLevel::from_dropout_probability(dist.get(StudentOutcome::Dropout)),
            confidence: dist.get(prediction),
        })
    }

    pub fn dropout_probability(&self) -> f64 {
        self.probabilities.dropout
    }
}

/// Per-entry result of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// Zero-based position in the input
    pub index: usize,
    pub outcome: Result<PredictionResult, PredictionError>,
}

/// Ordered batch results with aggregate counts
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchResult {
    pub fn from_entries(entries: Vec<BatchEntry>) -> Self {
        let succeeded = entries.iter().filter(|e| e.outcome.is_ok()).count();
        let total = entries.len();
        Self {
            entries,
            total,
            succeeded,
            failed: total - succeeded,
        }
    }
}
