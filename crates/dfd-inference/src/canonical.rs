//! Classifier output normalization.

use dfd_models::{CanonicalPrediction, ClassifierVariant, Verdict};
use tracing::warn;

/// Confidence attached to every prediction. The classifier heads expose no
/// calibrated probability, so this is a fixed placeholder.
pub const FIXED_CONFIDENCE: f64 = 1.0;

/// Map a raw classifier label to the canonical shape.
///
/// `1` means fake for every variant; `0` (knn, linear) and `-1` (svm) both
/// mean real, so no per-variant branching is needed.
pub fn canonicalize(raw: i64, variant: ClassifierVariant) -> CanonicalPrediction {
    if !variant.raw_domain().contains(&raw) {
        warn!(model_type = %variant, raw, "Classifier emitted a label outside its documented range");
    }

    let is_fake = raw == 1;
    CanonicalPrediction {
        label: if is_fake { Verdict::Fake } else { Verdict::Real },
        is_fake,
        confidence: FIXED_CONFIDENCE,
        raw_prediction: raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svm_labels() {
        let real = canonicalize(-1, ClassifierVariant::Svm);
        assert!(!real.is_fake);
        assert_eq!(real.label, Verdict::Real);
        assert_eq!(real.raw_prediction, -1);

        let fake = canonicalize(1, ClassifierVariant::Svm);
        assert!(fake.is_fake);
        assert_eq!(fake.label, Verdict::Fake);
    }

    #[test]
    fn test_binary_labels() {
        for variant in [ClassifierVariant::Knn, ClassifierVariant::Linear] {
            assert!(!canonicalize(0, variant).is_fake);
            assert!(canonicalize(1, variant).is_fake);
            assert_eq!(canonicalize(0, variant).label, Verdict::Real);
        }
    }

    #[test]
    fn test_confidence_is_fixed() {
        for variant in ClassifierVariant::ALL {
            for raw in variant.raw_domain() {
                assert_eq!(canonicalize(*raw, variant).confidence, 1.0);
            }
        }
    }

    #[test]
    fn test_out_of_range_label_is_real() {
        let prediction = canonicalize(7, ClassifierVariant::Knn);
        assert!(!prediction.is_fake);
        assert_eq!(prediction.raw_prediction, 7);
    }
}
