//! Axum HTTP API server for deepfake detection.
//!
//! This crate provides:
//! - Image, video and batch detection endpoints over multipart uploads
//! - Service, model and health information endpoints
//! - CORS, security headers, request IDs and request logging
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
