//! ONNX Runtime classifiers.
//!
//! Model directory layout:
//!
//! ```text
//! <model_dir>/extractor.onnx   ViT backbone, [N,3,224,224] -> last_hidden_state [N,T,D]
//! <model_dir>/knn.onnx         classifier heads, features [N,D] -> label [N] (int64)
//! <model_dir>/linear.onnx
//! <model_dir>/svm.onnx
//! ```
//!
//! The embedding is the CLS token (`last_hidden_state[:, 0, :]`). Extractors
//! exported with a pooled `[N, D]` output are accepted as-is.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dfd_media::NormalizedBatch;
use dfd_models::ClassifierVariant;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use crate::classifier::{Classifier, ClassifierLoader};
use crate::error::{InferenceError, InferenceResult};

/// File name of the shared feature extractor
pub const EXTRACTOR_FILE: &str = "extractor.onnx";
/// Extractor output holding per-token embeddings
const EXTRACTOR_OUTPUT: &str = "last_hidden_state";
/// Classifier head output holding predicted labels
const HEAD_OUTPUT: &str = "label";

/// Extractor + head sessions for one variant.
pub struct OnnxClassifier {
    variant: ClassifierVariant,
    extractor: Mutex<Session>,
    head: Mutex<Session>,
}

impl OnnxClassifier {
    pub fn load(
        variant: ClassifierVariant,
        extractor_path: &Path,
        head_path: &Path,
    ) -> InferenceResult<Self> {
        let extractor = Mutex::new(create_session(extractor_path)?);
        let head = Mutex::new(create_session(head_path)?);

        info!(
            model_type = %variant,
            extractor = %extractor_path.display(),
            head = %head_path.display(),
            "ONNX classifier initialized"
        );

        Ok(Self {
            variant,
            extractor,
            head,
        })
    }

    /// Run the backbone and return `(dim, features)` with one `dim`-long
    /// embedding per row, row-major.
    fn extract_features(&self, batch: &NormalizedBatch) -> InferenceResult<(usize, Vec<f32>)> {
        let shape: Vec<usize> = batch.tensor.shape().to_vec();
        let data: Vec<f32> = batch.tensor.iter().copied().collect();
        let input: Value = Tensor::from_array((shape, data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| InferenceError::inference(format!("Failed to create tensor: {}", e)))?;

        let mut session = self
            .extractor
            .lock()
            .map_err(|_| InferenceError::inference("Extractor session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| InferenceError::inference(format!("Extractor run failed: {}", e)))?;

        let output = outputs.get(EXTRACTOR_OUTPUT).ok_or_else(|| {
            InferenceError::inference(format!("Missing {} tensor", EXTRACTOR_OUTPUT))
        })?;

        let (dims, values) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::inference(format!("Failed to extract tensor: {}", e)))?;
        let dims: Vec<usize> = dims.iter().map(|d| (*d).max(0) as usize).collect();

        cls_features(&dims, values, batch.len())
    }

    fn predict_labels(&self, rows: usize, dim: usize, features: Vec<f32>) -> InferenceResult<Vec<i64>> {
        let input: Value = Tensor::from_array((vec![rows, dim], features.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| InferenceError::inference(format!("Failed to create tensor: {}", e)))?;

        let mut session = self
            .head
            .lock()
            .map_err(|_| InferenceError::inference("Classifier session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| InferenceError::inference(format!("Classifier run failed: {}", e)))?;

        let output = outputs
            .get(HEAD_OUTPUT)
            .ok_or_else(|| InferenceError::inference(format!("Missing {} tensor", HEAD_OUTPUT)))?;

        let (_, labels) = output
            .try_extract_tensor::<i64>()
            .map_err(|e| InferenceError::inference(format!("Failed to extract labels: {}", e)))?;

        Ok(labels.to_vec())
    }
}

impl Classifier for OnnxClassifier {
    fn variant(&self) -> ClassifierVariant {
        self.variant
    }

    fn classify(&self, batch: &NormalizedBatch) -> InferenceResult<Vec<i64>> {
        let rows = batch.len();
        let (dim, features) = self.extract_features(batch)?;
        debug!(model_type = %self.variant, rows, dim, "Extracted embeddings");
        self.predict_labels(rows, dim, features)
    }
}

/// Pull the CLS embedding out of a backbone output.
fn cls_features(dims: &[usize], values: &[f32], rows: usize) -> InferenceResult<(usize, Vec<f32>)> {
    match *dims {
        [n, tokens, dim] if n == rows && tokens > 0 && values.len() >= rows * tokens * dim => {
            let mut features = Vec::with_capacity(rows * dim);
            for row in 0..rows {
                let start = row * tokens * dim;
                features.extend_from_slice(&values[start..start + dim]);
            }
            Ok((dim, features))
        }
        [n, dim] if n == rows && values.len() == rows * dim => Ok((dim, values.to_vec())),
        _ => Err(InferenceError::inference(format!(
            "Unexpected extractor output shape {:?} for batch of {}",
            dims, rows
        ))),
    }
}

/// Create an ONNX Runtime session on the CPU execution provider.
fn create_session(model_path: &Path) -> InferenceResult<Session> {
    let model_bytes = std::fs::read(model_path)
        .map_err(|e| InferenceError::model_load(format!("Failed to read {}: {}", model_path.display(), e)))?;

    Session::builder()
        .map_err(|e| InferenceError::model_load(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| InferenceError::model_load(format!("Failed to set optimization level: {}", e)))?
        .commit_from_memory(&model_bytes)
        .map_err(|e| InferenceError::model_load(format!("Failed to load ONNX model: {}", e)))
}

/// Loads ONNX classifiers from a model directory.
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    model_dir: PathBuf,
}

impl OnnxModelLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    pub fn extractor_path(&self) -> PathBuf {
        self.model_dir.join(EXTRACTOR_FILE)
    }

    pub fn head_path(&self, variant: ClassifierVariant) -> PathBuf {
        self.model_dir.join(format!("{}.onnx", variant.as_str()))
    }

    /// Whether every file needed for `variant` is present.
    pub fn is_available(&self, variant: ClassifierVariant) -> bool {
        self.extractor_path().exists() && self.head_path(variant).exists()
    }
}

impl ClassifierLoader for OnnxModelLoader {
    fn load(&self, variant: ClassifierVariant) -> InferenceResult<Arc<dyn Classifier>> {
        let extractor = self.extractor_path();
        let head = self.head_path(variant);
        for path in [&extractor, &head] {
            if !path.exists() {
                return Err(InferenceError::ModelNotFound(path.clone()));
            }
        }

        Ok(Arc::new(OnnxClassifier::load(variant, &extractor, &head)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cls_token_is_first_token() {
        // 2 rows, 3 tokens, dim 2
        let values = [
            1.0, 2.0, 9.0, 9.0, 9.0, 9.0, //
            3.0, 4.0, 8.0, 8.0, 8.0, 8.0,
        ];
        let (dim, features) = cls_features(&[2, 3, 2], &values, 2).unwrap();
        assert_eq!(dim, 2);
        assert_eq!(features, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_pooled_output_passes_through() {
        let values = [1.0, 2.0, 3.0];
        let (dim, features) = cls_features(&[1, 3], &values, 1).unwrap();
        assert_eq!(dim, 3);
        assert_eq!(features, values.to_vec());
    }

    #[test]
    fn test_row_count_mismatch_is_rejected() {
        assert!(cls_features(&[3, 4], &[0.0; 12], 2).is_err());
        assert!(cls_features(&[4], &[0.0; 4], 4).is_err());
    }

    #[test]
    fn test_model_paths() {
        let loader = OnnxModelLoader::new("/models");
        assert_eq!(loader.extractor_path(), PathBuf::from("/models/extractor.onnx"));
        assert_eq!(loader.head_path(ClassifierVariant::Svm), PathBuf::from("/models/svm.onnx"));
    }

    #[test]
    fn test_missing_model_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let loader = OnnxModelLoader::new(dir.path());
        assert!(!loader.is_available(ClassifierVariant::Knn));
        match loader.load(ClassifierVariant::Knn) {
            Err(InferenceError::ModelNotFound(path)) => assert!(path.ends_with(EXTRACTOR_FILE)),
            other => panic!("expected ModelNotFound, got {:?}", other.map(|_| ())),
        }
    }
}
