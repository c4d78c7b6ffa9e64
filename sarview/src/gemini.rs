//! Gemini `generateContent` client.
//!
//! This module is only available when the `remote` feature is enabled.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::client::TextGenerator;
use crate::config::{env_var, required_env_var, timeout_from_env, DEFAULT_TIMEOUT_SECS};
use crate::earthengine::extract_error_message;
use crate::error::{Result, SarviewError};
use crate::prompt::DEFAULT_MODEL;

/// Public Generative Language API endpoint.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

const SERVICE: &str = "text-generation service";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model used by callers that do not pick one.
    pub model: String,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read the configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `GEMINI_API_KEY` | API key | Required |
    /// | `SARVIEW_GEMINI_MODEL` | Model name | `gemini-2.0-flash` |
    /// | `SARVIEW_GEMINI_URL` | API base URL | `https://generativelanguage.googleapis.com` |
    /// | `SARVIEW_TIMEOUT_SECS` | Request timeout | 60 |
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: required_env_var("GEMINI_API_KEY")?,
            model: env_var("SARVIEW_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_url: env_var("SARVIEW_GEMINI_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout_secs: timeout_from_env()?,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// [`TextGenerator`] backed by the Gemini REST API.
///
/// The API key travels in a header so it never shows up in URLs, and
/// therefore never in transport error messages.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SarviewError::Transport {
                service: SERVICE,
                source: Box::new(e),
            })?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate; `None` when it has no
    /// text part at all. Empty text is returned as is.
    fn into_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let mut texts = parts.into_iter().filter_map(|p| p.text).peekable();
        texts.peek()?;
        Some(texts.collect())
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            model
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .map_err(|e| SarviewError::Transport {
                service: SERVICE,
                source: Box::new(e),
            })?;

        let status = response.status();
        let body_text = response.text().unwrap_or_default();

        if !status.is_success() {
            return Err(SarviewError::Status {
                service: SERVICE,
                status: status.as_u16(),
                detail: extract_error_message(&body_text).unwrap_or(body_text),
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body_text).map_err(|e| SarviewError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            })?;

        parsed
            .into_text()
            .ok_or_else(|| SarviewError::InvalidResponse {
                service: SERVICE,
                reason: "no text in the first candidate".to_string(),
            })
    }
}
