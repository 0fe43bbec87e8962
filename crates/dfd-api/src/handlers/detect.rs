//! Detection handlers.
//!
//! Validation order matches across endpoints: model type, then content
//! type, then sampling parameters. Nothing is spooled to disk or decoded
//! until all of them pass.

use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::Json;
use dfd_inference::BatchInput;
use dfd_media::{persist_upload, upload_suffix};
use dfd_models::limits::MAX_BATCH_FILES;
use dfd_models::{
    AggregateResult, BatchItemResult, BatchSummary, CanonicalPrediction, ClassifierVariant,
    FakeFrame, ProcessingInfo,
};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_detection;
use crate::state::AppState;
use crate::upload::DetectionForm;

/// Suffix used when a video upload has no usable extension
const DEFAULT_VIDEO_SUFFIX: &str = ".mp4";

#[derive(Debug, Serialize)]
pub struct ImageDetectionResponse {
    pub success: bool,
    pub filename: String,
    pub model_used: ClassifierVariant,
    pub result: CanonicalPrediction,
    pub image_base64: String,
}

#[derive(Debug, Serialize)]
pub struct VideoDetectionResponse {
    pub success: bool,
    pub filename: String,
    pub model_used: ClassifierVariant,
    pub processing_info: ProcessingInfo,
    pub result: AggregateResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fake_frames: Option<Vec<FakeFrame>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fake_frames_count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BatchDetectionResponse {
    pub success: bool,
    pub model_used: ClassifierVariant,
    pub batch_summary: BatchSummary,
    pub individual_results: Vec<BatchItemResult>,
}

/// `POST /api/v1/detect/image`
pub async fn detect_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ImageDetectionResponse>> {
    let mut form = DetectionForm::read(multipart, state.config.max_file_size).await?;
    let model_type = form.model_type(state.config.default_model)?;
    let file = form.single_file()?;
    if !file.is_image() {
        return Err(ApiError::bad_request("File must be an image"));
    }

    let start = Instant::now();
    let filename = file.display_name();
    let detection = state
        .detector
        .detect_image(file.bytes.to_vec(), model_type)
        .await?;

    record_detection(
        "image",
        model_type.as_str(),
        detection.prediction.label.as_str(),
        start.elapsed().as_secs_f64(),
    );
    info!(
        filename = %filename,
        model_type = %model_type,
        prediction = %detection.prediction.label,
        "Image detection completed"
    );

    Ok(Json(ImageDetectionResponse {
        success: true,
        filename,
        model_used: model_type,
        result: detection.prediction,
        image_base64: detection.image_base64,
    }))
}

/// `POST /api/v1/detect/video`
pub async fn detect_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<VideoDetectionResponse>> {
    let mut form = DetectionForm::read(multipart, state.config.max_file_size).await?;
    let model_type = form.model_type(state.config.default_model)?;
    let file = form.single_file()?;
    if !file.is_video() {
        return Err(ApiError::bad_request("File must be a video"));
    }
    let params = form.sampling_params()?;
    params.validate().map_err(ApiError::bad_request)?;

    let start = Instant::now();
    let filename = file.display_name();
    let suffix = match upload_suffix(file.filename.as_deref()) {
        s if s.is_empty() => DEFAULT_VIDEO_SUFFIX.to_string(),
        s => s,
    };

    let bytes = file.bytes;
    let upload = tokio::task::spawn_blocking(move || persist_upload(&bytes, &suffix))
        .await
        .map_err(|e| ApiError::internal(format!("Upload task failed: {}", e)))?
        .map_err(dfd_inference::InferenceError::from)?;

    let detection = state
        .detector
        .detect_video(upload, params, model_type)
        .await?;

    record_detection(
        "video",
        model_type.as_str(),
        detection.result.overall_prediction.as_str(),
        start.elapsed().as_secs_f64(),
    );
    info!(
        filename = %filename,
        model_type = %model_type,
        frames = detection.processing_info.frames_extracted,
        fake_percentage = detection.result.fake_percentage,
        "Video detection completed"
    );

    let fake_frames_count = detection.fake_frames.as_ref().map(Vec::len);
    Ok(Json(VideoDetectionResponse {
        success: true,
        filename,
        model_used: model_type,
        processing_info: detection.processing_info,
        result: detection.result,
        fake_frames: detection.fake_frames,
        fake_frames_count,
    }))
}

/// `POST /api/v1/detect/batch`
pub async fn detect_batch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<BatchDetectionResponse>> {
    let form = DetectionForm::read(multipart, state.config.max_file_size).await?;
    let model_type = form.model_type(state.config.default_model)?;

    if form.files.is_empty() {
        return Err(ApiError::bad_request("No files uploaded"));
    }
    if form.files.len() > MAX_BATCH_FILES {
        return Err(ApiError::bad_request(format!(
            "Maximum {} files allowed in batch processing",
            MAX_BATCH_FILES
        )));
    }

    let start = Instant::now();
    let inputs: Vec<BatchInput> = form
        .files
        .into_iter()
        .map(|file| {
            let filename = file.display_name();
            if file.is_image() {
                BatchInput::Image {
                    filename,
                    bytes: file.bytes.to_vec(),
                }
            } else {
                BatchInput::Rejected {
                    filename,
                    reason: "File is not an image".to_string(),
                }
            }
        })
        .collect();

    let detection = state.detector.detect_batch(inputs, model_type).await?;

    let verdict = if detection.summary.fake_images > 0 { "Fake" } else { "Real" };
    record_detection("batch", model_type.as_str(), verdict, start.elapsed().as_secs_f64());

    Ok(Json(BatchDetectionResponse {
        success: true,
        model_used: model_type,
        batch_summary: detection.summary,
        individual_results: detection.results,
    }))
}
