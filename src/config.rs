//! Configuration types for blood-pressure image analysis.
//!
//! Everything the service needs at runtime lives in [`AnalyzerConfig`],
//! built once at startup via [`AnalyzerConfigBuilder`] and shared read-only
//! afterwards. There is no teardown: dropping the config (and the model it
//! resolved to) is enough.

use crate::error::AnalyzeError;
use crate::model::VisionModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default Gemini model, matching the model the service was first deployed with.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default base URL of the Gemini REST API.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Configuration for the analysis service.
///
/// Built via [`AnalyzerConfig::builder()`] or using
/// [`AnalyzerConfig::default()`].
///
/// # Example
/// ```rust
/// use bp_vision::{AnalyzerConfig, Variant};
///
/// let config = AnalyzerConfig::builder()
///     .variant(Variant::Multi)
///     .port(8080)
///     .api_key("test-key")
///     .build()
///     .unwrap();
/// assert_eq!(config.port, 8080);
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// Which pipeline `POST /analyze` runs. Default: [`Variant::Single`].
    pub variant: Variant,

    /// Model identifier passed to the provider. Default: `gemini-1.5-flash`.
    pub model: String,

    /// `edgequake-llm` provider name (e.g. "openai", "anthropic", "ollama").
    /// `None` or `"gemini"` selects the native Gemini client.
    pub provider_name: Option<String>,

    /// Pre-constructed model. Takes precedence over everything else.
    pub provider: Option<Arc<dyn VisionModel>>,

    /// Gemini API key, normally from `GEMINI_API_KEY`.
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API.
    pub gemini_base_url: String,

    /// Sampling temperature. `None` leaves the model default in place.
    pub temperature: Option<f32>,

    /// Output token cap. `None` leaves the model default in place.
    pub max_tokens: Option<usize>,

    /// Interface the HTTP server binds to. Default: `0.0.0.0`.
    pub host: String,

    /// Port the HTTP server binds to. Default: 5000.
    pub port: u16,

    /// Largest accepted request body in bytes. Default: 16 MiB.
    pub max_upload_bytes: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            model: DEFAULT_MODEL.to_string(),
            provider_name: None,
            provider: None,
            api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            temperature: None,
            max_tokens: None,
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("variant", &self.variant)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn VisionModel>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// `host:port` string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn variant(mut self, variant: Variant) -> Self {
        self.config.variant = variant;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn VisionModel>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gemini_base_url = url.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzeError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(AnalyzeError::InvalidConfig("Model name must not be empty".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(AnalyzeError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == Some(0) {
            return Err(AnalyzeError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which analysis pipeline a request goes through.
///
/// | Variant | Multipart field | Output schema |
/// |---------|-----------------|---------------|
/// | Single  | `file`          | `{systolic, diastolic, pulse, summary}` |
/// | Multi   | `files[]`       | `{readings: [{systolic, diastolic, pulse}], summary}` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// One image, one reading. (default)
    #[default]
    Single,
    /// One or more images, one reading per image plus a shared summary.
    Multi,
}

impl Variant {
    /// Name of the multipart field the variant reads its files from.
    pub fn field_name(self) -> &'static str {
        match self {
            Variant::Single => "file",
            Variant::Multi => "files[]",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Single => f.write_str("single"),
            Variant::Multi => f.write_str("multi"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = AnalyzerConfig::default();
        assert_eq!(c.variant, Variant::Single);
        assert_eq!(c.model, "gemini-1.5-flash");
        assert_eq!(c.port, 5000);
        assert_eq!(c.bind_address(), "0.0.0.0:5000");
        assert!(c.temperature.is_none());
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = AnalyzerConfig::builder().temperature(7.5).build().unwrap();
        assert_eq!(c.temperature, Some(2.0));
    }

    #[test]
    fn builder_rejects_empty_model() {
        let err = AnalyzerConfig::builder().model("  ").build().unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_upload_limit() {
        assert!(AnalyzerConfig::builder().max_upload_bytes(0).build().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = AnalyzerConfig::builder().api_key("super-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn field_names() {
        assert_eq!(Variant::Single.field_name(), "file");
        assert_eq!(Variant::Multi.field_name(), "files[]");
    }

    #[test]
    fn variant_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Variant::Multi).unwrap(), "\"multi\"");
    }
}
