//! Error types for classification and the detection pipeline.

use std::path::PathBuf;

use dfd_media::MediaError;
use dfd_models::UnsupportedClassifierError;
use thiserror::Error;

/// Result type for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Errors raised while loading classifiers or running detection.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    UnsupportedClassifier(#[from] UnsupportedClassifierError),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Classifier returned {actual} labels for a batch of {expected}")]
    OutputMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("Background task failed: {0}")]
    TaskJoin(String),
}

impl InferenceError {
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    pub fn model_load(message: impl Into<String>) -> Self {
        Self::ModelLoad(message.into())
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    /// True when the request itself was bad and retrying it cannot help.
    pub fn is_client_error(&self) -> bool {
        match self {
            InferenceError::UnsupportedClassifier(_) | InferenceError::InvalidParameters(_) => true,
            InferenceError::Media(e) => e.is_input_error(),
            _ => false,
        }
    }
}

impl From<tokio::task::JoinError> for InferenceError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::TaskJoin(e.to_string())
    }
}
