//! Shared data models for the deepfake detection service.
//!
//! This crate provides Serde-serializable types for:
//! - Classifier variants and their raw label conventions
//! - Canonical per-image predictions and aggregate verdicts
//! - Batch summaries
//! - Upload limits and video sampling parameters
//! - Video processing info and fake-frame evidence

pub mod batch;
pub mod classifier;
pub mod limits;
pub mod prediction;
pub mod sampling;
pub mod video;

// Re-export common types
pub use batch::{BatchItemResult, BatchSummary};
pub use classifier::{ClassifierVariant, UnsupportedClassifierError};
pub use prediction::{AggregateResult, AggregateSummary, CanonicalPrediction, ConfidenceLevel, Verdict};
pub use sampling::VideoSamplingParams;
pub use video::{FakeFrame, ProcessingInfo};
