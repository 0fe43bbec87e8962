//! Classifier seam.
//!
//! A classifier takes a normalized `[N, 3, 224, 224]` batch and returns one
//! integer label per row, in row order. Loading and running are blocking and
//! are driven from `spawn_blocking` by the registry and pipeline.

use std::sync::Arc;

use dfd_media::NormalizedBatch;
use dfd_models::ClassifierVariant;

use crate::error::{InferenceError, InferenceResult};

/// Feature extractor plus classifier head for one variant.
pub trait Classifier: Send + Sync {
    fn variant(&self) -> ClassifierVariant;

    /// One raw label per batch row, in row order.
    fn classify(&self, batch: &NormalizedBatch) -> InferenceResult<Vec<i64>>;
}

/// Builds classifiers on first use.
pub trait ClassifierLoader: Send + Sync {
    fn load(&self, variant: ClassifierVariant) -> InferenceResult<Arc<dyn Classifier>>;
}

/// Run a classifier and check it answered once per row.
pub fn classify_checked(
    classifier: &dyn Classifier,
    batch: &NormalizedBatch,
) -> InferenceResult<Vec<i64>> {
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    let labels = classifier.classify(batch)?;
    if labels.len() != batch.len() {
        return Err(InferenceError::OutputMismatch {
            expected: batch.len(),
            actual: labels.len(),
        });
    }
    Ok(labels)
}
