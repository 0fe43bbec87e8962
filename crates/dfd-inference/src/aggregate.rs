//! Folding per-unit predictions into a verdict.
//!
//! - overall verdict is `Fake` iff `fake_percentage > 50`
//! - confidence is `High` iff `fake_percentage > 80` or `< 20`, else `Medium`
//! - an empty input is 0% fake, `Real`, and never divides by zero

use dfd_models::{
    AggregateResult, AggregateSummary, BatchItemResult, BatchSummary, CanonicalPrediction,
    ClassifierVariant, ConfidenceLevel, Verdict,
};

use crate::canonical::canonicalize;

/// Percentage above which the overall verdict is `Fake`
pub const FAKE_VERDICT_THRESHOLD: f64 = 50.0;
/// Percentage above which the verdict is decisive
pub const HIGH_CONFIDENCE_UPPER: f64 = 80.0;
/// Percentage below which the verdict is decisive
pub const HIGH_CONFIDENCE_LOWER: f64 = 20.0;

/// `100 * fake / total`, or 0 when there is nothing to count.
pub fn fake_percentage(fake_count: usize, total_count: usize) -> f64 {
    if total_count == 0 {
        return 0.0;
    }
    100.0 * fake_count as f64 / total_count as f64
}

pub fn verdict_for(percentage: f64) -> Verdict {
    if percentage > FAKE_VERDICT_THRESHOLD {
        Verdict::Fake
    } else {
        Verdict::Real
    }
}

pub fn confidence_level(percentage: f64) -> ConfidenceLevel {
    if percentage > HIGH_CONFIDENCE_UPPER || percentage < HIGH_CONFIDENCE_LOWER {
        ConfidenceLevel::High
    } else {
        ConfidenceLevel::Medium
    }
}

/// Canonicalize raw labels in order and aggregate them.
pub fn aggregate(raw_predictions: &[i64], variant: ClassifierVariant) -> AggregateResult {
    let predictions = raw_predictions
        .iter()
        .map(|raw| canonicalize(*raw, variant))
        .collect();
    aggregate_predictions(predictions)
}

/// Aggregate already-canonical predictions, keeping their order.
pub fn aggregate_predictions(predictions: Vec<CanonicalPrediction>) -> AggregateResult {
    let total_count = predictions.len();
    let fake_count = predictions.iter().filter(|p| p.is_fake).count();
    let percentage = fake_percentage(fake_count, total_count);
    let overall_prediction = verdict_for(percentage);

    AggregateResult {
        overall_prediction,
        fake_percentage: percentage,
        fake_count,
        total_count,
        individual_predictions: predictions,
        summary: AggregateSummary {
            likely_fake: overall_prediction.is_fake(),
            confidence_level: confidence_level(percentage),
        },
    }
}

/// Batch view: counts over successful items only, failures counted separately.
pub fn summarize_batch(results: &[BatchItemResult]) -> BatchSummary {
    let successful: Vec<&CanonicalPrediction> = results
        .iter()
        .filter(|r| r.success)
        .filter_map(|r| r.result.as_ref())
        .collect();
    let fake_images = successful.iter().filter(|p| p.is_fake).count();

    BatchSummary {
        total_files: results.len(),
        successful_predictions: successful.len(),
        failed_predictions: results.len() - successful.len(),
        fake_images,
        fake_percentage: fake_percentage(fake_images, successful.len()),
    }
}
