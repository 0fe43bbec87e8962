//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while decoding or preparing media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Could not open video file: {0}")]
    VideoOpen(String),

    #[error("Frame decoding failed: {0}")]
    Decode(String),

    #[error("Could not extract frames from video")]
    NoFramesExtracted,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a video open failure error.
    pub fn video_open(message: impl Into<String>) -> Self {
        Self::VideoOpen(message.into())
    }

    /// Create a mid-stream decode failure error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create an invalid image error.
    pub fn invalid_image(message: impl Into<String>) -> Self {
        Self::InvalidImage(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the failure is caused by the uploaded content rather than by
    /// the host (missing binaries, IO, bugs).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MediaError::VideoOpen(_)
                | MediaError::Decode(_)
                | MediaError::NoFramesExtracted
                | MediaError::InvalidImage(_)
                | MediaError::Image(_)
        )
    }
}
