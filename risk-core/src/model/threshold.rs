//! Risk Thresholds
//!
//! Fixed cut-offs on the Dropout probability. The tier bands are part of the
//! public contract and are intentionally not configurable.

use serde::{Deserialize, Serialize};

/// Below this the student is Low risk
pub const MEDIUM_RISK_FLOOR: f64 = 0.30;

/// Above this (strictly) the student is High risk
pub const HIGH_RISK_CEILING: f64 = 0.70;

/// Records at or above this probability qualify for the high-risk registry
pub const PERSIST_THRESHOLD: f64 = 0.70;

/// Lower edge of the Critical urgency band
pub const CRITICAL_URGENCY_FLOOR: f64 = 0.90;

/// Lower edge of the VeryHigh urgency band
pub const VERY_HIGH_URGENCY_FLOOR: f64 = 0.80;

/// Discrete risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// p < 0.30 → Low, 0.30 ≤ p ≤ 0.70 → Medium, p > 0.70 → High
    pub fn from_dropout_probability(p: f64) -> Self {
        if p < MEDIUM_RISK_FLOOR {
            RiskLevel::Low
        } else if p > HIGH_RISK_CEILING {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(RiskLevel::Low),
            "Medium" => Some(RiskLevel::Medium),
            "High" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a Dropout probability qualifies for persistence.
/// Note: 0.70 itself is Medium but still persisted.
pub fn should_persist(dropout_probability: f64) -> bool {
    dropout_probability >= PERSIST_THRESHOLD
}

/// Triage band for persisted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterventionUrgency {
    /// p ≥ 0.9: immediate intervention
    Critical,
    /// p ≥ 0.8: urgent intervention
    VeryHigh,
    /// p ≥ 0.7: intervention recommended
    Elevated,
}

impl InterventionUrgency {
    pub fn from_dropout_probability(p: f64) -> Option<Self> {
        if p >= CRITICAL_URGENCY_FLOOR {
            Some(InterventionUrgency::Critical)
        } else if p >= VERY_HIGH_URGENCY_FLOOR {
            Some(InterventionUrgency::VeryHigh)
        } else if p >= PERSIST_THRESHOLD {
            Some(InterventionUrgency::Elevated)
        } else {
            None
        }
    }
}

/// Counts per urgency band
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyBreakdown {
    pub critical: u64,
    pub very_high: u64,
    pub elevated: u64,
}

impl UrgencyBreakdown {
    pub fn from_probabilities<I: IntoIterator<Item = f64>>(probabilities: I) -> Self {
        let mut breakdown = Self::default();
        for p in probabilities {
            match InterventionUrgency::from_dropout_probability(p) {
                Some(InterventionUrgency::Critical) => breakdown.critical += 1,
                Some(InterventionUrgency::VeryHigh) => breakdown.very_high += 1,
                Some(InterventionUrgency::Elevated) => breakdown.elevated += 1,
                None => {}
            }
        }
        breakdown
    }
}
