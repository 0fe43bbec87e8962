//! Classification and verdict aggregation.
//!
//! - [`ClassifierRegistry`]: lazily loaded classifiers, one per variant
//! - [`OnnxModelLoader`]: ONNX Runtime extractor + classifier heads
//! - [`canonicalize`], [`aggregate`], [`select_evidence`]: turning raw labels
//!   into verdicts and fake-frame evidence
//! - [`Detector`]: the image, video and batch pipelines

pub mod aggregate;
pub mod canonical;
pub mod classifier;
pub mod error;
pub mod evidence;
pub mod metrics;
pub mod onnx;
pub mod pipeline;
pub mod registry;

pub use aggregate::{aggregate, aggregate_predictions, summarize_batch};
pub use canonical::canonicalize;
pub use classifier::{classify_checked, Classifier, ClassifierLoader};
pub use error::{InferenceError, InferenceResult};
pub use evidence::{select_evidence, FakeFrameEvidence};
pub use onnx::{OnnxClassifier, OnnxModelLoader};
pub use pipeline::{BatchDetection, BatchInput, Detector, ImageDetection, VideoDetection};
pub use registry::ClassifierRegistry;
