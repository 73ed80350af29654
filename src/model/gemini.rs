//! Native Gemini `generateContent` client.
//!
//! Request layout (one user turn, parts in order):
//!
//! ```text
//! contents[0].parts = [ {text: prompt}, {inlineData: image 1}, {inlineData: image 2}, … ]
//! generationConfig  = { responseMimeType: "application/json", … }
//! ```
//!
//! The answer text is the concatenation of every text part of the first
//! candidate. It is returned verbatim.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzeError;
use crate::model::{ModelResponse, VisionModel};
use async_trait::async_trait;
use edgequake_llm::ImageData;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

const JSON_MIME_TYPE: &str = "application/json";
/// The key travels in a header so it never appears in a request URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini REST client configured for JSON output.
#[derive(Clone)]
pub struct GeminiModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    label: String,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
}

impl std::fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModel")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: crate::config::DEFAULT_GEMINI_BASE_URL.to_string(),
            label: format!("gemini/{model}"),
            model,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn from_config(api_key: &str, config: &AnalyzerConfig) -> Self {
        let mut m = Self::new(api_key, &config.model).with_base_url(&config.gemini_base_url);
        m.temperature = config.temperature;
        m.max_tokens = config.max_tokens;
        m
    }

    /// Point the client at a proxy or a mock server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request<'a>(&self, prompt: &'a str, images: &'a [ImageData]) -> GenerateContentRequest<'a> {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(Part::Text { text: prompt });
        parts.extend(images.iter().map(|img| Part::InlineData {
            inline_data: InlineData {
                mime_type: &img.mime_type,
                data: &img.data,
            },
        }));

        GenerateContentRequest {
            contents: vec![Content { role: "user", parts }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl VisionModel for GeminiModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate_json(
        &self,
        prompt: &str,
        images: &[ImageData],
    ) -> Result<ModelResponse, AnalyzeError> {
        let request = self.build_request(prompt, images);

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzeError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                AnalyzeError::Transport(format!("invalid response body: {}", e.without_url()))
            })?;

        let text = parsed.text().ok_or(AnalyzeError::EmptyModelResponse)?;
        let usage = parsed.usage_metadata.unwrap_or_default();
        debug!(
            "{}: {} input tokens, {} output tokens",
            self.label, usage.prompt_token_count, usage.candidates_token_count
        );

        Ok(ModelResponse {
            text,
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        })
    }
}

fn map_status(status: StatusCode, body: String) -> AnalyzeError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AnalyzeError::AuthError {
            provider: "gemini".to_string(),
            detail: body,
        },
        StatusCode::TOO_MANY_REQUESTS => AnalyzeError::RateLimitExceeded {
            provider: "gemini".to_string(),
        },
        _ => AnalyzeError::ModelApi {
            status: status.as_u16(),
            message: body,
        },
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}
