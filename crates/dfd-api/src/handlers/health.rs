//! Health, readiness and service information handlers.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use dfd_models::limits::{ALLOWED_IMAGE_TYPES, ALLOWED_VIDEO_TYPES};
use dfd_models::ClassifierVariant;
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "Deepfake Detection API";
const SERVICE_DESCRIPTION: &str =
    "API for detecting deepfakes in images and videos using Vision Transformer models";

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Compute device the classifiers run on.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub device: &'static str,
    pub accelerator_available: bool,
}

impl DeviceInfo {
    /// Sessions are built on the ONNX Runtime CPU execution provider.
    pub fn current() -> Self {
        Self {
            device: "cpu",
            accelerator_available: false,
        }
    }
}

/// Service banner.
#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub device_info: DeviceInfo,
    pub api: &'static str,
}

/// `GET /`
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        device_info: DeviceInfo::current(),
        api: "/api/v1",
    })
}

#[derive(Serialize)]
pub struct SupportedFormats {
    pub images: &'static [&'static str],
    pub videos: &'static [&'static str],
}

/// API index.
#[derive(Serialize)]
pub struct ApiIndexResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
    pub supported_formats: SupportedFormats,
}

/// `GET /api/v1`
pub async fn api_index() -> Json<ApiIndexResponse> {
    let endpoints = BTreeMap::from([
        ("/detect/image", "Detect deepfakes in images"),
        ("/detect/video", "Detect deepfakes in videos"),
        ("/detect/batch", "Detect deepfakes in up to 20 images"),
        ("/health", "Health check endpoint"),
        ("/models", "List available models"),
    ]);

    Json(ApiIndexResponse {
        message: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: SERVICE_DESCRIPTION,
        endpoints,
        supported_formats: SupportedFormats {
            images: ALLOWED_IMAGE_TYPES,
            videos: ALLOWED_VIDEO_TYPES,
        },
    })
}

/// Detailed health including resident classifiers.
#[derive(Serialize)]
pub struct ServiceHealthResponse {
    pub status: &'static str,
    pub device_info: DeviceInfo,
    pub loaded_models: Vec<ClassifierVariant>,
    pub uptime_secs: u64,
}

/// `GET /api/v1/health`
pub async fn service_health(State(state): State<AppState>) -> Json<ServiceHealthResponse> {
    Json(ServiceHealthResponse {
        status: "healthy",
        device_info: DeviceInfo::current(),
        loaded_models: state.registry().loaded_variants(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ffmpeg: CheckStatus,
    pub ffprobe: CheckStatus,
    pub models: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms: Some(latency_ms),
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

fn check_binary(name: &str) -> CheckStatus {
    let start = Instant::now();
    match which::which(name) {
        Ok(_) => CheckStatus::ok(start.elapsed().as_millis() as u64),
        Err(e) => CheckStatus::error(format!("{} not found: {}", name, e)),
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks the FFmpeg tools and that the default classifier can be served.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let ffmpeg = check_binary("ffmpeg");
    let ffprobe = check_binary("ffprobe");

    let default_model = state.config.default_model;
    let models = {
        let start = Instant::now();
        match state.registry().get(default_model).await {
            Ok(_) => CheckStatus::ok(start.elapsed().as_millis() as u64),
            Err(e) => CheckStatus::error(e.to_string()),
        }
    };

    let all_ok = ffmpeg.is_ok() && ffprobe.is_ok() && models.is_ok();

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            ffmpeg,
            ffprobe,
            models,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
