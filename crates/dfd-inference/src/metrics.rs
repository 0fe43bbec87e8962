//! Inference metrics.
//!
//! - Model load counters by variant and outcome
//! - Inference latency by variant
//! - Frames sampled per video

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Classifier constructions by model type and status.
    pub const MODEL_LOADS_TOTAL: &str = "dfd_model_loads_total";

    /// Model load latency in seconds by model type.
    pub const MODEL_LOAD_SECONDS: &str = "dfd_model_load_seconds";

    /// Batch inference latency in seconds by model type.
    pub const INFERENCE_SECONDS: &str = "dfd_inference_seconds";

    /// Frames sampled per video request.
    pub const FRAMES_SAMPLED: &str = "dfd_frames_sampled";
}

/// Record a classifier load attempt.
pub fn record_model_load(model_type: &str, success: bool, latency_ms: f64) {
    counter!(
        names::MODEL_LOADS_TOTAL,
        "model_type" => model_type.to_string(),
        "status" => if success { "success" } else { "error" }
    )
    .increment(1);

    if success {
        histogram!(names::MODEL_LOAD_SECONDS, "model_type" => model_type.to_string())
            .record(latency_ms / 1000.0);
    }
}

/// Record one classifier batch run.
pub fn record_inference(model_type: &str, latency_ms: f64) {
    histogram!(names::INFERENCE_SECONDS, "model_type" => model_type.to_string())
        .record(latency_ms / 1000.0);
}

/// Record how many frames a video yielded.
pub fn record_frames_sampled(count: usize) {
    histogram!(names::FRAMES_SAMPLED).record(count as f64);
}
