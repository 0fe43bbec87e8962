//! Per-variant classifier registry.
//!
//! Each variant has its own `OnceCell`, so at most one construction is in
//! flight per variant: concurrent first requests wait on the same load. The
//! load runs in its own task, so a caller that is cancelled mid-load does not
//! release the slot early. A failed load leaves the slot empty and the next
//! request tries again. Entries are never evicted.

use std::sync::Arc;
use std::time::Instant;

use dfd_models::ClassifierVariant;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::classifier::{Classifier, ClassifierLoader};
use crate::error::InferenceResult;
use crate::metrics::record_model_load;

type Slot = Arc<OnceCell<Arc<dyn Classifier>>>;

pub struct ClassifierRegistry {
    loader: Arc<dyn ClassifierLoader>,
    slots: [Slot; 3],
}

impl ClassifierRegistry {
    pub fn new(loader: Arc<dyn ClassifierLoader>) -> Self {
        Self {
            loader,
            slots: [
                Arc::new(OnceCell::new()),
                Arc::new(OnceCell::new()),
                Arc::new(OnceCell::new()),
            ],
        }
    }

    /// Get the classifier for `variant`, loading it on first use.
    pub async fn get(&self, variant: ClassifierVariant) -> InferenceResult<Arc<dyn Classifier>> {
        let slot = &self.slots[variant.slot()];
        if let Some(classifier) = slot.get() {
            return Ok(Arc::clone(classifier));
        }

        // The spawned task owns the init permit until the load settles, even
        // if this future is dropped.
        let slot = Arc::clone(slot);
        let loader = Arc::clone(&self.loader);
        tokio::spawn(async move {
            let classifier = slot.get_or_try_init(|| load(loader, variant)).await?;
            InferenceResult::Ok(Arc::clone(classifier))
        })
        .await?
    }

    /// Variants currently resident, in registry order.
    pub fn loaded_variants(&self) -> Vec<ClassifierVariant> {
        ClassifierVariant::ALL
            .into_iter()
            .filter(|v| self.slots[v.slot()].initialized())
            .collect()
    }

    pub fn is_loaded(&self, variant: ClassifierVariant) -> bool {
        self.slots[variant.slot()].initialized()
    }

    /// Load the given variants ahead of the first request.
    pub async fn preload(&self, variants: &[ClassifierVariant]) -> InferenceResult<()> {
        for variant in variants {
            self.get(*variant).await?;
        }
        Ok(())
    }
}

async fn load(
    loader: Arc<dyn ClassifierLoader>,
    variant: ClassifierVariant,
) -> InferenceResult<Arc<dyn Classifier>> {
    info!(model_type = %variant, "Loading classifier");
    let start = Instant::now();

    let result = match tokio::task::spawn_blocking(move || loader.load(variant)).await {
        Ok(result) => result,
        Err(e) => Err(e.into()),
    };

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    record_model_load(variant.as_str(), result.is_ok(), elapsed_ms);

    match &result {
        Ok(_) => info!(model_type = %variant, duration_ms = elapsed_ms as u64, "Classifier loaded"),
        Err(e) => error!(model_type = %variant, error = %e, "Failed to load classifier"),
    }
    result
}
