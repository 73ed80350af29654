//! Error types for the bp-vision library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AnalyzeError`]: **Fatal**: the request cannot be answered at all
//!   (model not configured, model call failed, image could not be
//!   re-encoded). Returned as `Err(AnalyzeError)` from the
//!   [`crate::analyze::Analyzer`] entry points and turned into a 500 by the
//!   HTTP layer.
//!
//! * [`Rejection`]: **Non-fatal**: one uploaded file is not an acceptable
//!   image. Carried inside [`crate::pipeline::validate::Validation`] so the
//!   caller can see *why* a file was refused. Rejections never reach the
//!   model and end up as an `{"error": …}` envelope, not as an HTTP error.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the bp-vision library.
///
/// Per-file validation failures use [`Rejection`] and are never propagated
/// through this type.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    // ── Model errors ──────────────────────────────────────────────────────
    /// No vision model could be built from the configuration.
    #[error("Vision model '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The model API answered with a non-success status.
    #[error("Model API error (HTTP {status}): {message}")]
    ModelApi { status: u16, message: String },

    /// An `edgequake-llm` provider call failed.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The model API rejected the credential (401/403).
    #[error("Authentication error from provider '{provider}': {detail}")]
    AuthError { provider: String, detail: String },

    /// The model API answered HTTP 429.
    #[error("Rate limit exceeded for provider '{provider}'")]
    RateLimitExceeded { provider: String },

    /// The request never produced an HTTP answer (DNS, TLS, connection reset…).
    #[error("Model transport error: {0}")]
    Transport(String),

    /// The model answered successfully but without any text part.
    #[error("Model returned no text")]
    EmptyModelResponse,

    // ── Image errors ──────────────────────────────────────────────────────
    /// An accepted image could not be re-encoded for the model payload.
    #[error("Image encoding failed: {0}")]
    Encode(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A local file given to the CLI could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a single uploaded file was not accepted as an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The part carried an empty filename.
    #[error("upload has no filename")]
    MissingFilename,

    /// The filename has no `.` at all.
    #[error("'{filename}' has no file extension")]
    MissingExtension { filename: String },

    /// The extension is not one of png, jpg, jpeg, gif.
    #[error("'{filename}': extension '{extension}' is not an accepted image type")]
    UnsupportedExtension { filename: String, extension: String },

    /// The leading bytes do not match any accepted image format.
    #[error("'{filename}': content is not a recognised image format")]
    UnrecognisedFormat { filename: String },

    /// The header or pixel data failed to decode.
    #[error("'{filename}': image is corrupt: {detail}")]
    Corrupt { filename: String, detail: String },
}
