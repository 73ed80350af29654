//! HTTP-level tests for the `/` and `/analyze` routes.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the
//! vision model is a recording test double, so no network access is needed.
//!
//! Run with:
//!   cargo test --test http

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bp_vision::{router, router_with_limit, AnalyzeError, Analyzer, AppState, ModelResponse, Variant, VisionModel};
use edgequake_llm::ImageData;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

const BOUNDARY: &str = "bp-vision-test-boundary";

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Answers with a fixed text and remembers the image sizes of every call.
struct RecordingModel {
    answer: String,
    calls: Mutex<Vec<Vec<(u32, u32)>>>,
}

impl RecordingModel {
    fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Vec<(u32, u32)>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for RecordingModel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate_json(
        &self,
        _prompt: &str,
        images: &[ImageData],
    ) -> Result<ModelResponse, AnalyzeError> {
        let dims = images
            .iter()
            .map(|img| {
                let bytes = STANDARD.decode(&img.data).expect("base64");
                let decoded = image::load_from_memory(&bytes).expect("png");
                (decoded.width(), decoded.height())
            })
            .collect();
        self.calls.lock().unwrap().push(dims);
        Ok(ModelResponse::new(self.answer.clone()))
    }
}

struct UnreachableModel;

#[async_trait]
impl VisionModel for UnreachableModel {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn generate_json(
        &self,
        _prompt: &str,
        _images: &[ImageData],
    ) -> Result<ModelResponse, AnalyzeError> {
        Err(AnalyzeError::Transport("connection refused".into()))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn app(model: Arc<dyn VisionModel>, variant: Variant) -> Router {
    init_tracing();
    router(AppState::new(Analyzer::new(model), variant))
}

fn solid_png(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([30, 30, 220, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("png encode");
    buf
}

/// A multipart part: field name, optional filename, content.
struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    content: Vec<u8>,
}

fn file<'a>(name: &'a str, filename: &'a str, content: Vec<u8>) -> Part<'a> {
    Part {
        name,
        filename: Some(filename),
        content,
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(&part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post_analyze(app: Router, parts: &[Part<'_>]) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn as_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("JSON body")
}

// ── Single-image variant ─────────────────────────────────────────────────────

#[tokio::test]
async fn single_png_round_trip_is_transparent() {
    let answer = r#"{"systolic": 120, "diastolic": 80, "pulse": 70, "summary": "Normal."}"#;
    let model = RecordingModel::answering(answer);
    let app = app(model.clone(), Variant::Single);

    let (status, body) = post_analyze(app, &[file("file", "reading.png", solid_png(10, 10))]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&body), json!({ "result": answer }));
    assert_eq!(model.calls(), vec![vec![(10, 10)]]);
}

#[tokio::test]
async fn single_txt_is_invalid_file_type() {
    let model = RecordingModel::answering("{}");
    let app = app(model.clone(), Variant::Single);

    let (status, body) = post_analyze(app, &[file("file", "reading.txt", b"120/80".to_vec())]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&body), json!({ "error": "Invalid file type" }));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn single_corrupt_png_is_invalid_file_type() {
    let model = RecordingModel::answering("{}");
    let app = app(model.clone(), Variant::Single);

    let (_, body) = post_analyze(app, &[file("file", "reading.png", b"not an image".to_vec())]).await;

    assert_eq!(as_json(&body), json!({ "error": "Invalid file type" }));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn single_missing_field_and_empty_filename() {
    let model = RecordingModel::answering("{}");

    let (_, body) = post_analyze(
        app(model.clone(), Variant::Single),
        &[file("other", "reading.png", solid_png(2, 2))],
    )
    .await;
    assert_eq!(as_json(&body), json!({ "error": "No file part" }));

    // A text field named `file` is not a file part.
    let (_, body) = post_analyze(
        app(model.clone(), Variant::Single),
        &[Part {
            name: "file",
            filename: None,
            content: b"reading.png".to_vec(),
        }],
    )
    .await;
    assert_eq!(as_json(&body), json!({ "error": "No file part" }));

    let (_, body) = post_analyze(
        app(model.clone(), Variant::Single),
        &[file("file", "", Vec::new())],
    )
    .await;
    assert_eq!(as_json(&body), json!({ "error": "No selected file" }));

    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn non_multipart_body_counts_as_no_file_part() {
    let app = app(RecordingModel::answering("{}"), Variant::Single);
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(as_json(&bytes), json!({ "error": "No file part" }));
}

#[tokio::test]
async fn model_failure_is_a_server_error() {
    let app = app(Arc::new(UnreachableModel), Variant::Single);

    let (status, body) = post_analyze(app, &[file("file", "reading.png", solid_png(4, 4))]).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"Internal Server Error");
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() {
    init_tracing();
    let model = RecordingModel::answering("{}");
    let state = AppState::new(Analyzer::new(model.clone()), Variant::Single);
    let app = router_with_limit(state, 1024);

    let (status, body) = post_analyze(app, &[file("file", "big.png", vec![0u8; 64 * 1024])]).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, b"Upload too large");
    assert!(model.calls().is_empty());
}

// ── Multi-image variant ──────────────────────────────────────────────────────

#[tokio::test]
async fn multi_drops_invalid_extension_and_keeps_order() {
    let model = RecordingModel::answering(r#"{"readings": [], "summary": ""}"#);
    let app = app(model.clone(), Variant::Multi);

    let (status, body) = post_analyze(
        app,
        &[
            file("files[]", "notes.txt", b"hello".to_vec()),
            file("files[]", "first.png", solid_png(8, 2)),
            file("files[]", "second.jpeg.txt", solid_png(1, 1)),
            file("files[]", "third.png", solid_png(3, 9)),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(as_json(&body).get("result").is_some());
    assert_eq!(model.calls(), vec![vec![(8, 2), (3, 9)]]);
}

#[tokio::test]
async fn multi_drops_png_with_text_content() {
    let model = RecordingModel::answering(r#"{"readings": [], "summary": ""}"#);
    let app = app(model.clone(), Variant::Multi);

    let (status, body) = post_analyze(
        app,
        &[
            file("files[]", "fake.png", b"120/80 pulse 70".to_vec()),
            file("files[]", "real.png", solid_png(5, 6)),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(as_json(&body).get("result").is_some());
    assert_eq!(model.calls(), vec![vec![(5, 6)]]);
}

#[tokio::test]
async fn multi_only_corrupt_png_is_no_valid_image_files() {
    let model = RecordingModel::answering("{}");
    let app = app(model.clone(), Variant::Multi);

    let (_, body) = post_analyze(app, &[file("files[]", "fake.png", b"hello".to_vec())]).await;

    assert_eq!(as_json(&body), json!({ "error": "No valid image files" }));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn multi_only_invalid_file_is_no_valid_image_files() {
    let model = RecordingModel::answering("{}");
    let app = app(model.clone(), Variant::Multi);

    let (_, body) = post_analyze(app, &[file("files[]", "reading.txt", b"x".to_vec())]).await;

    assert_eq!(as_json(&body), json!({ "error": "No valid image files" }));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn multi_missing_and_empty() {
    let model = RecordingModel::answering("{}");

    let (_, body) = post_analyze(
        app(model.clone(), Variant::Multi),
        &[file("file", "reading.png", solid_png(2, 2))],
    )
    .await;
    assert_eq!(as_json(&body), json!({ "error": "No files uploaded" }));

    let (_, body) = post_analyze(
        app(model.clone(), Variant::Multi),
        &[file("files[]", "", Vec::new())],
    )
    .await;
    assert_eq!(as_json(&body), json!({ "error": "No selected files" }));

    assert!(model.calls().is_empty());
}

// ── Index page ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn index_renders_form_for_variant() {
    let app = app(RecordingModel::answering("{}"), Variant::Multi);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains(r#"name="files[]""#));
}
