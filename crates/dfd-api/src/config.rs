//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

use dfd_models::limits::file_size_limit_bytes;
use dfd_models::ClassifierVariant;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// Max size of a single uploaded file
    pub max_file_size: usize,
    /// Directory holding the ONNX extractor and classifier heads
    pub model_dir: PathBuf,
    /// Classifier used when a request does not name one
    pub default_model: ClassifierVariant,
    /// Classifiers to load at startup
    pub preload_models: Vec<ClassifierVariant>,
    /// Environment (development/production)
    pub environment: String,
    /// Serve Prometheus metrics at /metrics
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(300),
            max_body_size: 250 * 1024 * 1024, // 250MB
            max_file_size: file_size_limit_bytes(),
            model_dir: PathBuf::from("./models"),
            default_model: ClassifierVariant::default(),
            preload_models: Vec::new(),
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_var(&["API_HOST", "HOST"]).unwrap_or(defaults.host),
            port: env_var(&["API_PORT", "PORT"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            request_timeout: std::env::var("REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            max_file_size: std::env::var("MAX_FILE_SIZE_MB")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(defaults.max_file_size),
            model_dir: std::env::var("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            default_model: std::env::var("DEFAULT_MODEL_TYPE")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.default_model),
            preload_models: std::env::var("PRELOAD_MODELS")
                .map(|s| parse_variants(&s))
                .unwrap_or_default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// First set variable among `names`.
fn env_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}

/// Parse a comma-separated variant list, skipping unknown names and duplicates.
fn parse_variants(value: &str) -> Vec<ClassifierVariant> {
    let mut variants = Vec::new();
    for variant in value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<ClassifierVariant>().ok())
    {
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}
