//! Multipart form parsing for detection endpoints.
//!
//! File parts are any parts carrying a filename; everything else is a text
//! field. Each file is checked against the per-file size limit as it is read.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use dfd_models::limits::{is_image_content_type, is_video_content_type};
use dfd_models::{ClassifierVariant, VideoSamplingParams};

use crate::error::{ApiError, ApiResult};

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn display_name(&self) -> String {
        self.filename.clone().unwrap_or_else(|| self.field.clone())
    }

    pub fn is_image(&self) -> bool {
        self.content_type.as_deref().is_some_and(is_image_content_type)
    }

    pub fn is_video(&self) -> bool {
        self.content_type.as_deref().is_some_and(is_video_content_type)
    }
}

/// A parsed detection form.
#[derive(Debug, Default)]
pub struct DetectionForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl DetectionForm {
    /// Read every part of the request.
    pub async fn read(mut multipart: Multipart, max_file_size: usize) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            if filename.is_some() {
                let bytes = field.bytes().await?;
                if bytes.len() > max_file_size {
                    return Err(ApiError::payload_too_large(format!(
                        "File too large. Maximum size is {}MB",
                        max_file_size / (1024 * 1024)
                    )));
                }
                form.files.push(UploadedFile {
                    field: name,
                    filename,
                    content_type,
                    bytes,
                });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// `model_type`, falling back to `default` when absent.
    pub fn model_type(&self, default: ClassifierVariant) -> ApiResult<ClassifierVariant> {
        match self.field("model_type") {
            Some(value) => value
                .parse()
                .map_err(|e: dfd_models::UnsupportedClassifierError| ApiError::bad_request(e.to_string())),
            None => Ok(default),
        }
    }

    /// `frame_rate` and `max_frames`; range checks happen in `validate`.
    pub fn sampling_params(&self) -> ApiResult<VideoSamplingParams> {
        let frame_rate = match self.field("frame_rate") {
            Some(value) => Some(
                value
                    .parse::<f64>()
                    .map_err(|_| ApiError::bad_request("frame_rate must be a number"))?,
            ),
            None => None,
        };

        let max_frames = match self.field("max_frames") {
            Some(value) => value
                .parse::<i64>()
                .map_err(|_| ApiError::bad_request("max_frames must be an integer"))?,
            None => i64::from(VideoSamplingParams::default().max_frames),
        };
        // Out-of-range values (including negatives) fail validation as 0.
        let max_frames = u32::try_from(max_frames).unwrap_or(0);

        Ok(VideoSamplingParams::new(frame_rate, max_frames))
    }

    /// The single file of an image or video request.
    pub fn single_file(&mut self) -> ApiResult<UploadedFile> {
        if self.files.is_empty() {
            return Err(ApiError::bad_request("No file uploaded"));
        }
        Ok(self.files.remove(0))
    }
}
