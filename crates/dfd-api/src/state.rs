//! Application state.

use std::sync::Arc;
use std::time::Instant;

use dfd_inference::{ClassifierLoader, ClassifierRegistry, Detector, OnnxModelLoader};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub detector: Detector,
    pub started_at: Instant,
}

impl AppState {
    /// Create state backed by ONNX models from `config.model_dir`.
    pub fn new(config: ApiConfig) -> Self {
        let loader = Arc::new(OnnxModelLoader::new(config.model_dir.clone()));
        Self::with_loader(config, loader)
    }

    /// Create state with a custom classifier loader.
    pub fn with_loader(config: ApiConfig, loader: Arc<dyn ClassifierLoader>) -> Self {
        let registry = Arc::new(ClassifierRegistry::new(loader));
        Self {
            config,
            detector: Detector::new(registry),
            started_at: Instant::now(),
        }
    }

    pub fn registry(&self) -> &Arc<ClassifierRegistry> {
        self.detector.registry()
    }
}
