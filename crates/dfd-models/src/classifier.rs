//! Classifier variant definitions.
//!
//! The feature extractor is shared; the classifier head on top of it comes in
//! three flavours with different raw label conventions:
//!
//! - `Knn`: k-nearest neighbours, `0 = Real`, `1 = Fake`
//! - `Linear`: linear classifier, `0 = Real`, `1 = Fake`
//! - `Svm`: one-class SVM, `-1 = Real`, `1 = Fake`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Classifier head used on top of the feature extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierVariant {
    /// K-nearest neighbours (default).
    #[default]
    Knn,

    /// Linear classifier.
    Linear,

    /// One-class support vector machine.
    Svm,
}

impl ClassifierVariant {
    /// All supported variants, in registry order.
    pub const ALL: [ClassifierVariant; 3] = [
        ClassifierVariant::Knn,
        ClassifierVariant::Linear,
        ClassifierVariant::Svm,
    ];

    /// Returns the variant name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierVariant::Knn => "knn",
            ClassifierVariant::Linear => "linear",
            ClassifierVariant::Svm => "svm",
        }
    }

    /// Returns a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            ClassifierVariant::Knn => "K-Nearest Neighbors classifier (Default)",
            ClassifierVariant::Linear => "Linear classifier",
            ClassifierVariant::Svm => "Support Vector Machine with One-Class SVM",
        }
    }

    /// Describes the raw label convention of this variant.
    pub fn output_format(&self) -> &'static str {
        match self {
            ClassifierVariant::Knn | ClassifierVariant::Linear => "0=Real, 1=Fake",
            ClassifierVariant::Svm => "-1=Real, 1=Fake",
        }
    }

    /// Raw values this variant is documented to emit.
    pub fn raw_domain(&self) -> &'static [i64] {
        match self {
            ClassifierVariant::Knn | ClassifierVariant::Linear => &[0, 1],
            ClassifierVariant::Svm => &[-1, 1],
        }
    }

    /// Stable slot used by fixed-size per-variant tables.
    pub fn slot(&self) -> usize {
        match self {
            ClassifierVariant::Knn => 0,
            ClassifierVariant::Linear => 1,
            ClassifierVariant::Svm => 2,
        }
    }
}

impl fmt::Display for ClassifierVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClassifierVariant {
    type Err = UnsupportedClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "knn" => Ok(ClassifierVariant::Knn),
            "linear" => Ok(ClassifierVariant::Linear),
            "svm" => Ok(ClassifierVariant::Svm),
            _ => Err(UnsupportedClassifierError(s.to_string())),
        }
    }
}

/// Raised for any `model_type` outside `knn`, `linear`, `svm`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid model_type '{0}'. Choose from: knn, linear, svm")]
pub struct UnsupportedClassifierError(pub String);
