//! Vision model abstraction: the seam between the pipeline and the network.
//!
//! The pipeline only ever talks to `Arc<dyn VisionModel>`. Two backends
//! ship with the crate:
//!
//! * [`gemini::GeminiModel`]: calls Gemini `generateContent` directly so the
//!   request can set `responseMimeType = "application/json"`.
//! * [`provider::ProviderModel`]: wraps any `edgequake-llm` provider
//!   (OpenAI, Anthropic, Ollama, …) for deployments that are not on Gemini.
//!
//! Tests substitute their own implementation through
//! [`crate::config::AnalyzerConfigBuilder::provider`].
//!
//! The model is resolved once at startup, never mutated afterwards, and
//! shared by every request. Implementations must therefore be stateless
//! with respect to individual requests.

pub mod gemini;
pub mod provider;

use crate::config::AnalyzerConfig;
use crate::error::AnalyzeError;
use async_trait::async_trait;
use edgequake_llm::{ImageData, ProviderFactory};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub use gemini::GeminiModel;
pub use provider::ProviderModel;

/// Raw answer from a vision model.
///
/// `text` is expected to be JSON but is never checked; it travels to the
/// caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelResponse {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl ModelResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_tokens: 0,
            output_tokens: 0,
        }
    }
}

/// A generative model that accepts one prompt plus images and answers with text.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Short label used in logs, e.g. `gemini/gemini-1.5-flash`.
    fn name(&self) -> &str;

    /// Submit `prompt` followed by `images` (in order) with JSON output requested.
    ///
    /// Errors are returned as-is; callers do not retry.
    async fn generate_json(
        &self,
        prompt: &str,
        images: &[ImageData],
    ) -> Result<ModelResponse, AnalyzeError>;
}

/// Resolve the vision model, from most-specific to least-specific.
///
/// 1. **Pre-built model** (`config.provider`): used as-is.
/// 2. **Named provider** (`config.provider_name`, anything but `"gemini"`):
///    built through [`ProviderFactory::create_llm_provider`], which reads that
///    provider's own API key from the environment.
/// 3. **Native Gemini**: requires `config.api_key`.
pub fn resolve_model(config: &AnalyzerConfig) -> Result<Arc<dyn VisionModel>, AnalyzeError> {
    if let Some(ref model) = config.provider {
        return Ok(Arc::clone(model));
    }

    if let Some(ref name) = config.provider_name {
        if !name.eq_ignore_ascii_case("gemini") {
            let llm = ProviderFactory::create_llm_provider(name, &config.model).map_err(|e| {
                AnalyzeError::ProviderNotConfigured {
                    provider: name.clone(),
                    hint: format!("{e}"),
                }
            })?;
            info!("Using edgequake-llm provider {}/{}", name, config.model);
            return Ok(Arc::new(ProviderModel::new(llm, name, config)));
        }
    }

    match config.api_key.as_deref() {
        Some(key) if !key.is_empty() => {
            info!("Using Gemini model {}", config.model);
            Ok(Arc::new(GeminiModel::from_config(key, config)))
        }
        _ => Err(AnalyzeError::ProviderNotConfigured {
            provider: "gemini".to_string(),
            hint: "Set GEMINI_API_KEY, or choose another provider with --provider.".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait]
    impl VisionModel for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate_json(
            &self,
            _prompt: &str,
            _images: &[ImageData],
        ) -> Result<ModelResponse, AnalyzeError> {
            Ok(ModelResponse::new("{}"))
        }
    }

    #[test]
    fn prebuilt_model_wins() {
        let config = AnalyzerConfig::builder()
            .provider(Arc::new(Fixed))
            .provider_name("openai")
            .build()
            .unwrap();
        let model = resolve_model(&config).unwrap();
        assert_eq!(model.name(), "fixed");
    }

    #[test]
    fn gemini_needs_a_key() {
        let config = AnalyzerConfig::default();
        let err = resolve_model(&config).err().expect("must fail without key");
        assert!(matches!(err, AnalyzeError::ProviderNotConfigured { .. }));
    }

    #[test]
    fn gemini_with_key() {
        let config = AnalyzerConfig::builder()
            .provider_name("Gemini")
            .api_key("k")
            .build()
            .unwrap();
        let model = resolve_model(&config).unwrap();
        assert_eq!(model.name(), "gemini/gemini-1.5-flash");
    }
}
