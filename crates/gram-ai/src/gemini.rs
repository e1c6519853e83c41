//! Gemini generative-model client
//!
//! Talks to the `generateContent` REST endpoint. Requests carry one text
//! part plus optional inline binary parts (photos, audio); the response is
//! returned as plain text, exactly as the model produced it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::AdapterError;
use crate::media::Media;
use crate::Result;

const SERVICE: &str = "gemini";
/// Header carrying the API key, so it never appears in a request URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key (required for real calls)
    pub api_key: Option<String>,
    /// Model name, e.g. "gemini-2.5-flash"
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// Transport-level timeout; the pipeline applies its own per-stage deadline on top
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl GeminiConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific key and model
    pub fn new(api_key: &str, model: &str) -> Self {
        GeminiConfig {
            api_key: Some(api_key.to_string()),
            model: model.to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Point the client at a different endpoint (proxies, local mocks)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// One part of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineData(Media),
}

/// A single-turn generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    pub parts: Vec<ContentPart>,
}

impl GenerateRequest {
    /// Request consisting of a single text prompt
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Text(prompt.into())],
        }
    }

    /// Attach an inline binary part after the existing parts
    pub fn with_media(mut self, media: Media) -> Self {
        self.parts.push(ContentPart::InlineData(media));
        self
    }

    /// Concatenated text parts (used for logging and fakes)
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::InlineData(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of inline binary parts
    pub fn media_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, ContentPart::InlineData(_)))
            .count()
    }
}

/// A text-generating model that accepts multimodal prompts.
///
/// Implementations must be safe to share across concurrent pipelines.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Run one generation and return the model's raw text.
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct WireRequest {
    contents: Vec<WireContent>,
}

#[derive(Debug, Serialize)]
struct WireContent {
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart {
    Text { text: String },
    Inline { inline_data: WireInlineData },
}

#[derive(Debug, Serialize)]
struct WireInlineData {
    mime_type: String,
    data: String,
}

impl From<&GenerateRequest> for WireRequest {
    fn from(request: &GenerateRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => WirePart::Text { text: text.clone() },
                ContentPart::InlineData(media) => WirePart::Inline {
                    inline_data: WireInlineData {
                        mime_type: media.mime_type.clone(),
                        data: media.to_base64(),
                    },
                },
            })
            .collect();
        WireRequest {
            contents: vec![WireContent { parts }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Pull the first candidate's text out of a decoded response.
fn response_text(response: GenerateResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(AdapterError::Declined {
            service: SERVICE,
            reason,
        });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }

    match candidate.finish_reason.as_deref() {
        Some("STOP") | None => Err(AdapterError::EmptyResponse { service: SERVICE }),
        Some(reason) => Err(AdapterError::Declined {
            service: SERVICE,
            reason: reason.to_string(),
        }),
    }
}

/// Gemini REST client
pub struct GeminiClient {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("gramconnect/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(GeminiClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env())
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    #[instrument(skip_all, fields(model = %self.config.model, media = request.media_count()))]
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AdapterError::NotConfigured {
                service: SERVICE,
                reason: "GEMINI_API_KEY is not set".to_string(),
            })?;

        let body = WireRequest::from(request);
        let response = self
            .http_client
            .post(self.config.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            warn!(status = status.as_u16(), "Gemini request failed");
            return Err(AdapterError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let decoded: GenerateResponse =
            response.json().await.map_err(|e| AdapterError::Decode {
                service: SERVICE,
                message: e.without_url().to_string(),
            })?;

        let text = response_text(decoded)?;
        debug!(chars = text.chars().count(), "Gemini response received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: serde_json::Value) -> GenerateResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_gemini_config_new() {
        let config = GeminiConfig::new("key-123", "gemini-2.5-flash")
            .with_base_url("http://localhost:8080/");
        assert_eq!(config.api_key.as_deref(), Some("key-123"));
        assert_eq!(
            config.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = GeminiConfig::new("SECRET-KEY-123", "gemini-2.5-flash");
        let shown = format!("{config:?}");
        assert!(!shown.contains("SECRET-KEY-123"));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn test_wire_request_shape() {
        let request = GenerateRequest::text("describe")
            .with_media(Media::new("image/png", b"hello".to_vec()));
        let wire = serde_json::to_value(WireRequest::from(&request)).unwrap();

        assert_eq!(wire["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(
            wire["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
        assert_eq!(
            wire["contents"][0]["parts"][1]["inline_data"]["data"],
            "aGVsbG8="
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response = decode(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"explanation\":"}, {"text": "\"E\"}"}]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(response_text(response).unwrap(), "{\"explanation\":\"E\"}");
    }

    #[test]
    fn test_response_blocked_prompt_is_declined() {
        let response = decode(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }));
        match response_text(response) {
            Err(AdapterError::Declined { reason, .. }) => assert_eq!(reason, "SAFETY"),
            other => panic!("expected Declined, got {other:?}"),
        }
    }

    #[test]
    fn test_response_without_text() {
        let response = decode(serde_json::json!({
            "candidates": [{"content": {"parts": []}, "finishReason": "STOP"}]
        }));
        assert!(matches!(
            response_text(response),
            Err(AdapterError::EmptyResponse { .. })
        ));

        let response = decode(serde_json::json!({
            "candidates": [{"finishReason": "RECITATION"}]
        }));
        assert!(matches!(
            response_text(response),
            Err(AdapterError::Declined { .. })
        ));
    }

    #[test]
    fn test_prompt_text_skips_media() {
        let request = GenerateRequest::text("a")
            .with_media(Media::new("audio/webm", vec![0]));
        assert_eq!(request.prompt_text(), "a");
        assert_eq!(request.media_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let config = GeminiConfig::new("SECRET-KEY-123", "gemini-2.5-flash")
            .with_base_url("http://127.0.0.1:1");
        let client = GeminiClient::new(config).unwrap();

        let err = client
            .generate(&GenerateRequest::text("hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, AdapterError::Http(_)));
        let text = err.to_string();
        assert!(!text.contains("SECRET-KEY-123"), "key in error: {text}");
        assert!(!text.contains("127.0.0.1"), "url in error: {text}");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let mut config = GeminiConfig::new("unused", "gemini-2.5-flash");
        config.api_key = None;
        let client = GeminiClient::new(config).unwrap();

        let err = client
            .generate(&GenerateRequest::text("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::NotConfigured { .. }));
    }
}
