//! API integration tests.
//!
//! The router runs in-process against a classifier that labels bright images
//! fake and dark images real, so no model files are needed.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use dfd_api::{create_router, ApiConfig, AppState};
use dfd_inference::{Classifier, ClassifierLoader, InferenceResult};
use dfd_media::NormalizedBatch;
use dfd_models::ClassifierVariant;
use image::{ImageOutputFormat, Rgb, RgbImage};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "dfd-test-boundary";

struct BrightnessClassifier {
    variant: ClassifierVariant,
}

impl Classifier for BrightnessClassifier {
    fn variant(&self) -> ClassifierVariant {
        self.variant
    }

    fn classify(&self, batch: &NormalizedBatch) -> InferenceResult<Vec<i64>> {
        let real = if self.variant == ClassifierVariant::Svm { -1 } else { 0 };
        Ok(batch
            .tensor
            .outer_iter()
            .map(|row| if row.mean().unwrap_or(0.0) > 0.0 { 1 } else { real })
            .collect())
    }
}

#[derive(Default)]
struct FakeLoader {
    loads: AtomicUsize,
}

impl ClassifierLoader for FakeLoader {
    fn load(&self, variant: ClassifierVariant) -> InferenceResult<Arc<dyn Classifier>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(BrightnessClassifier { variant }))
    }
}

fn test_router_with(config: ApiConfig) -> (Router, Arc<FakeLoader>) {
    let loader = Arc::new(FakeLoader::default());
    let state = AppState::with_loader(config, loader.clone());
    (create_router(state, None), loader)
}

fn test_router() -> Router {
    test_router_with(ApiConfig::default()).0
}

fn png(value: u8) -> Vec<u8> {
    let image = RgbImage::from_pixel(256, 256, Rgb([value, value, value]));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
    buf.into_inner()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        bytes: Vec<u8>,
    },
}

fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn image_part<'a>(filename: &'a str, content_type: &'a str, bytes: Vec<u8>) -> Part<'a> {
    Part::File {
        name: "file",
        filename,
        content_type,
        bytes,
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

/// Test health endpoint.
#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = get(test_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");

    let (status, _) = get(test_router(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_root_banner() {
    let (status, json) = get(test_router(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Deepfake Detection API");
    assert_eq!(json["device_info"]["device"], "cpu");
    assert_eq!(json["api"], "/api/v1");
}

#[tokio::test]
async fn test_api_index() {
    let (status, json) = get(test_router(), "/api/v1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["endpoints"]["/detect/video"].is_string());
    assert!(json["supported_formats"]["images"]
        .as_array()
        .unwrap()
        .contains(&Value::from("image/png")));
}

#[tokio::test]
async fn test_models_endpoint() {
    let (status, json) = get(test_router(), "/api/v1/models").await;
    assert_eq!(status, StatusCode::OK);

    let models = json["available_models"].as_array().unwrap();
    let names: Vec<&str> = models.iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["knn", "linear", "svm"]);
    assert_eq!(models[2]["output_format"], "-1=Real, 1=Fake");
    assert_eq!(json["default_model"], "knn");
}

#[tokio::test]
async fn test_service_health_reports_loaded_models() {
    let (app, _) = test_router_with(ApiConfig::default());

    let (_, before) = get(app.clone(), "/api/v1/health").await;
    assert_eq!(before["loaded_models"], Value::Array(vec![]));

    let request = multipart_request(
        "/api/v1/detect/image",
        vec![
            image_part("a.png", "image/png", png(10)),
            Part::Text("model_type", "svm"),
        ],
    );
    let (status, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = get(app, "/api/v1/health").await;
    assert_eq!(after["loaded_models"], Value::from(vec!["svm"]));
    assert_eq!(after["status"], "healthy");
}

#[tokio::test]
async fn test_detect_image_fake() {
    let request = multipart_request(
        "/api/v1/detect/image",
        vec![image_part("bright.png", "image/png", png(250))],
    );
    let (status, json) = send(test_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["filename"], "bright.png");
    assert_eq!(json["model_used"], "knn");
    assert_eq!(json["result"]["prediction"], "Fake");
    assert_eq!(json["result"]["is_fake"], true);
    assert_eq!(json["result"]["confidence"], 1.0);
    assert_eq!(json["result"]["raw_prediction"], 1);
    assert!(!json["image_base64"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_detect_image_svm_real() {
    let request = multipart_request(
        "/api/v1/detect/image",
        vec![
            Part::Text("model_type", "svm"),
            image_part("dark.png", "image/png", png(5)),
        ],
    );
    let (status, json) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["prediction"], "Real");
    assert_eq!(json["result"]["raw_prediction"], -1);
}

#[tokio::test]
async fn test_invalid_model_type_fails_before_loading() {
    let (app, loader) = test_router_with(ApiConfig::default());
    let request = multipart_request(
        "/api/v1/detect/image",
        vec![
            Part::Text("model_type", "forest"),
            image_part("a.png", "image/png", png(250)),
        ],
    );
    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["detail"].as_str().unwrap().contains("Choose from: knn, linear, svm"));
    assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_detect_image_rejects_non_image() {
    let request = multipart_request(
        "/api/v1/detect/image",
        vec![image_part("notes.txt", "text/plain", b"hello".to_vec())],
    );
    let (status, json) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "File must be an image");
}

#[tokio::test]
async fn test_detect_image_corrupt_upload() {
    let request = multipart_request(
        "/api/v1/detect/image",
        vec![image_part("broken.png", "image/png", b"\x89PNG broken".to_vec())],
    );
    let (status, json) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_media");
}

#[tokio::test]
async fn test_missing_file() {
    let request = multipart_request("/api/v1/detect/image", vec![Part::Text("model_type", "knn")]);
    let (status, json) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "No file uploaded");
}

#[tokio::test]
async fn test_file_size_limit() {
    let config = ApiConfig {
        max_file_size: 16,
        ..ApiConfig::default()
    };
    let (app, _) = test_router_with(config);
    let request = multipart_request(
        "/api/v1/detect/image",
        vec![image_part("big.png", "image/png", png(250))],
    );
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_detect_video_rejects_non_video() {
    let request = multipart_request(
        "/api/v1/detect/video",
        vec![image_part("clip.png", "image/png", png(1))],
    );
    let (status, json) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "File must be a video");
}

#[tokio::test]
async fn test_detect_video_parameter_ranges() {
    let cases = [
        ("max_frames", "0", "max_frames must be between 1 and 100"),
        ("max_frames", "101", "max_frames must be between 1 and 100"),
        ("frame_rate", "0", "frame_rate must be between 0 and 60 fps"),
        ("frame_rate", "61", "frame_rate must be between 0 and 60 fps"),
    ];

    for (field, value, expected) in cases {
        let request = multipart_request(
            "/api/v1/detect/video",
            vec![
                image_part("clip.mp4", "video/mp4", b"not really a video".to_vec()),
                Part::Text(field, value),
            ],
        );
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}={}", field, value);
        assert_eq!(json["detail"], expected);
    }
}

#[tokio::test]
#[ignore = "requires ffmpeg and ffprobe on PATH"]
async fn test_detect_video_undecodable_upload() {
    let request = multipart_request(
        "/api/v1/detect/video",
        vec![image_part("clip.mp4", "video/mp4", b"not really a video".to_vec())],
    );
    let (status, json) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_batch_with_one_corrupt_file() {
    let request = multipart_request(
        "/api/v1/detect/batch",
        vec![
            Part::File { name: "files", filename: "one.png", content_type: "image/png", bytes: png(250) },
            Part::File { name: "files", filename: "two.png", content_type: "image/png", bytes: b"corrupt".to_vec() },
            Part::File { name: "files", filename: "three.png", content_type: "image/png", bytes: png(5) },
        ],
    );
    let (status, json) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::OK);

    let summary = &json["batch_summary"];
    assert_eq!(summary["total_files"], 3);
    assert_eq!(summary["successful_predictions"], 2);
    assert_eq!(summary["failed_predictions"], 1);
    assert_eq!(summary["fake_images"], 1);
    assert_eq!(summary["fake_percentage"], 50.0);

    let results = json["individual_results"].as_array().unwrap();
    assert_eq!(results[0]["filename"], "one.png");
    assert_eq!(results[0]["result"]["prediction"], "Fake");
    assert_eq!(results[1]["success"], false);
    assert!(results[1]["error"].is_string());
    assert!(results[1].get("result").is_none());
    assert_eq!(results[2]["result"]["prediction"], "Real");
}

#[tokio::test]
async fn test_batch_non_image_is_item_failure() {
    let request = multipart_request(
        "/api/v1/detect/batch",
        vec![
            Part::File { name: "files", filename: "a.txt", content_type: "text/plain", bytes: b"x".to_vec() },
            Part::File { name: "files", filename: "b.png", content_type: "image/png", bytes: png(250) },
        ],
    );
    let (status, json) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["individual_results"][0]["error"], "File is not an image");
    assert_eq!(json["batch_summary"]["fake_percentage"], 100.0);
}

#[tokio::test]
async fn test_batch_limit() {
    let parts = (0..21)
        .map(|_| Part::File {
            name: "files",
            filename: "x.png",
            content_type: "image/png",
            bytes: vec![0u8; 4],
        })
        .collect();
    let (status, json) = send(test_router(), multipart_request("/api/v1/detect/batch", parts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Maximum 20 files allowed in batch processing");
}

/// Test security headers.
#[tokio::test]
async fn test_security_headers() {
    let response = test_router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("x-request-id").is_some());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
}

/// Test CORS headers.
#[tokio::test]
async fn test_cors_preflight() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/detect/image")
                .header("Origin", "http://localhost:3000")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status() == StatusCode::OK || response.status() == StatusCode::NO_CONTENT);
    assert!(response.headers().get("access-control-allow-origin").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, json) = get(test_router(), "/api/v2/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}
