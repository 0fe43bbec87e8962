//! Prediction and verdict types.
//!
//! Wire names follow the public API: a canonical prediction serializes its
//! label as `prediction`, and an aggregate reports `fake_frames` /
//! `total_frames`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary verdict for a single image, a frame, or a whole video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Real,
    Fake,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "Real",
            Verdict::Fake => "Fake",
        }
    }

    pub fn is_fake(&self) -> bool {
        matches!(self, Verdict::Fake)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifier output normalized across variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPrediction {
    /// `Fake` iff `raw_prediction == 1`
    #[serde(rename = "prediction")]
    pub label: Verdict,
    pub is_fake: bool,
    /// Always 1.0: the classifier heads expose no calibrated probability.
    pub confidence: f64,
    /// Raw label as emitted by the classifier head
    pub raw_prediction: i64,
}

/// How decisive an aggregate verdict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "High"),
            ConfidenceLevel::Medium => write!(f, "Medium"),
        }
    }
}

/// Verdict summary attached to an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub likely_fake: bool,
    pub confidence_level: ConfidenceLevel,
}

/// Per-frame predictions folded into a single verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub overall_prediction: Verdict,
    /// `100 * fake_count / total_count`, 0 for an empty input
    pub fake_percentage: f64,
    #[serde(rename = "fake_frames")]
    pub fake_count: usize,
    #[serde(rename = "total_frames")]
    pub total_count: usize,
    /// One entry per input, in input order
    pub individual_predictions: Vec<CanonicalPrediction>,
    pub summary: AggregateSummary,
}

impl AggregateResult {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        self.summary.confidence_level
    }

    pub fn is_fake(&self) -> bool {
        self.overall_prediction.is_fake()
    }
}
