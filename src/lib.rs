//! # bp-vision
//!
//! Read the systolic, diastolic and pulse values off photos of a digital
//! blood-pressure monitor using a Vision Language Model, and return the
//! model's JSON answer.
//!
//! The crate does no OCR of its own. It decides which uploads are real
//! images, frames a fixed extraction prompt, sends prompt plus images to the
//! model with JSON output requested, and hands back whatever text comes
//! back inside a small envelope.
//!
//! ## Pipeline Overview
//!
//! ```text
//! multipart upload
//!  │
//!  ├─ 1. Validate  extension ∈ {png,jpg,jpeg,gif}, header verify, decode
//!  ├─ 2. Prompt    fixed text for the single or multi schema
//!  ├─ 3. Encode    DynamicImage → base64 PNG
//!  ├─ 4. Model     one call: Gemini (JSON mode) or any edgequake-llm provider
//!  └─ 5. Respond   {"result": <model text>} | {"error": <message>}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bp_vision::{Analyzer, AnalyzerConfig, Upload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalyzerConfig::builder()
//!         .api_key(std::env::var("GEMINI_API_KEY")?)
//!         .build()?;
//!     let analyzer = Analyzer::from_config(&config)?;
//!     let envelope = analyzer
//!         .analyze_single(Some(Upload::from_path("reading.jpg")?))
//!         .await?;
//!     println!("{}", serde_json::to_string(&envelope)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bp-vision` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod reading;
pub mod server;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::Analyzer;
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, Variant};
pub use error::{AnalyzeError, Rejection};
pub use model::{resolve_model, GeminiModel, ModelResponse, ProviderModel, VisionModel};
pub use pipeline::respond::Envelope;
pub use pipeline::validate::{validate_upload, Validation};
pub use prompts::PromptSpec;
pub use reading::{Reading, Report};
pub use server::{router, router_with_limit, serve, AppState, ServeError};
pub use upload::{AnalysisRequest, Upload, UploadedImage};
