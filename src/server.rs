//! HTTP surface: an upload form and the analysis endpoint.
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `GET /` | HTML upload form for the configured variant |
//! | `POST /analyze` | multipart upload → JSON envelope |
//!
//! Only multipart parts that carry a filename are treated as files, so a
//! plain text field named `file` counts as "no file part". A body that is
//! not `multipart/form-data` at all is treated the same way.
//!
//! Validation outcomes are always HTTP 200 with an envelope. Only a failed
//! model call turns into a 500.

use crate::analyze::Analyzer;
use crate::config::{AnalyzerConfig, Variant};
use crate::error::AnalyzeError;
use crate::pipeline::respond::Envelope;
use crate::upload::Upload;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const INDEX_TEMPLATE: &str = include_str!("../static/index.html");

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub variant: Variant,
    index_html: Arc<str>,
}

impl AppState {
    pub fn new(analyzer: Analyzer, variant: Variant) -> Self {
        Self {
            analyzer,
            variant,
            index_html: render_index(variant).into(),
        }
    }
}

/// Build the router with the default body limit of `AnalyzerConfig`.
pub fn router(state: AppState) -> Router {
    router_with_limit(state, AnalyzerConfig::default().max_upload_bytes)
}

/// Build the router with an explicit request body limit.
pub fn router_with_limit(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve the model, bind, and serve until Ctrl-C.
pub async fn serve(config: &AnalyzerConfig) -> Result<(), ServeError> {
    let analyzer = Analyzer::from_config(config)?;
    let state = AppState::new(analyzer, config.variant);
    let app = router_with_limit(state, config.max_upload_bytes);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| ServeError::Bind {
            address: address.clone(),
            source,
        })?;
    info!(
        "Listening on {} ({} variant, model {})",
        address, config.variant, config.model
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Io)
}

/// Failures that stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[source] std::io::Error),
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.index_html.to_string())
}

async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Envelope>, HandlerError> {
    let uploads = match multipart {
        Ok(multipart) => collect_files(multipart, state.variant.field_name()).await?,
        Err(rejection) => {
            warn!("Not a multipart request: {}", rejection);
            Vec::new()
        }
    };

    let envelope = state.analyzer.analyze(state.variant, uploads).await?;
    Ok(Json(envelope))
}

/// Read every file part named `field`, in order. Other parts are skipped.
async fn collect_files(mut multipart: Multipart, field: &str) -> Result<Vec<Upload>, HandlerError> {
    let mut uploads = Vec::new();
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(HandlerError::multipart)?
    {
        if part.name() != Some(field) {
            continue;
        }
        let Some(filename) = part.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = part
            .bytes()
            .await
            .map_err(HandlerError::multipart)?;
        uploads.push(Upload::new(filename, bytes.to_vec()));
    }
    Ok(uploads)
}

fn render_index(variant: Variant) -> String {
    let multiple = match variant {
        Variant::Single => "",
        Variant::Multi => "multiple",
    };
    INDEX_TEMPLATE
        .replace("{{field}}", variant.field_name())
        .replace("{{multiple}}", multiple)
}

/// Handler failures that are not expressible as an envelope.
#[derive(Debug)]
enum HandlerError {
    /// Keeps axum's status: 413 past the body limit, 400 otherwise.
    BadMultipart { status: StatusCode, detail: String },
    Analyze(AnalyzeError),
}

impl HandlerError {
    fn multipart(e: MultipartError) -> Self {
        HandlerError::BadMultipart {
            status: e.status(),
            detail: e.body_text(),
        }
    }
}

impl From<AnalyzeError> for HandlerError {
    fn from(e: AnalyzeError) -> Self {
        HandlerError::Analyze(e)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::BadMultipart { status, detail } => {
                warn!("Rejected multipart body ({}): {}", status, detail);
                let body = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "Upload too large"
                } else {
                    "Malformed multipart body"
                };
                (status, body).into_response()
            }
            HandlerError::Analyze(e) => {
                error!("Analysis failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
