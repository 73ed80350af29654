//! Adapter exposing an `edgequake-llm` provider as a [`VisionModel`].
//!
//! ## Message layout
//!
//! 1. **System message**: [`JSON_ONLY_INSTRUCTION`]; these providers have no
//!    uniform JSON response mode, so the constraint is stated in text
//! 2. **User message**: the extraction prompt with every image attached,
//!    in upload order

use crate::config::AnalyzerConfig;
use crate::error::AnalyzeError;
use crate::model::{ModelResponse, VisionModel};
use crate::prompts::JSON_ONLY_INSTRUCTION;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::sync::Arc;
use tracing::debug;

/// Any `edgequake-llm` chat provider with vision support.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    label: String,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
}

impl ProviderModel {
    pub fn new(provider: Arc<dyn LLMProvider>, provider_name: &str, config: &AnalyzerConfig) -> Self {
        Self {
            provider,
            label: format!("{}/{}", provider_name, config.model),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Default::default()
        }
    }
}

#[async_trait]
impl VisionModel for ProviderModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate_json(
        &self,
        prompt: &str,
        images: &[ImageData],
    ) -> Result<ModelResponse, AnalyzeError> {
        let messages = vec![
            ChatMessage::system(JSON_ONLY_INSTRUCTION),
            ChatMessage::user_with_images(prompt, images.to_vec()),
        ];
        let options = self.build_options();

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| AnalyzeError::LlmApiError {
                message: format!("{}: {}", self.label, e),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.label, response.prompt_tokens, response.completion_tokens
        );

        if response.content.is_empty() {
            return Err(AnalyzeError::EmptyModelResponse);
        }

        Ok(ModelResponse {
            text: response.content,
            input_tokens: response.prompt_tokens as u64,
            output_tokens: response.completion_tokens as u64,
        })
    }
}
