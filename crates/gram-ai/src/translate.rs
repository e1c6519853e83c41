//! Google Translate client
//!
//! Uses the public `translate_a/single` endpoint with automatic source
//! language detection. The response is a nested JSON array whose first
//! element holds `[translated, original, ...]` segments, one per sentence.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::AdapterError;
use crate::Result;

const SERVICE: &str = "translate";

/// Translation service configuration
#[derive(Debug, Clone)]
pub struct TranslateConfig {
    /// Service base URL
    pub base_url: String,
    /// Transport-level timeout
    pub request_timeout: Duration,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        TranslateConfig {
            base_url: std::env::var("TRANSLATE_BASE_URL")
                .unwrap_or_else(|_| "https://translate.googleapis.com".to_string()),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TranslateConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific server
    pub fn new(base_url: &str) -> Self {
        TranslateConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Converts free text into a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` (ISO 639-1 code, e.g. "en").
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Join the translated segments of a `translate_a/single` response.
fn parse_translation(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| AdapterError::Decode {
            service: SERVICE,
            message: "missing segment list".to_string(),
        })?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(AdapterError::EmptyResponse { service: SERVICE });
    }
    Ok(translated)
}

/// Detected source language, when the service reports one.
fn detected_language(body: &Value) -> Option<&str> {
    body.get(2).and_then(Value::as_str)
}

/// Google Translate HTTP client
pub struct GoogleTranslateClient {
    config: TranslateConfig,
    http_client: reqwest::Client,
}

impl GoogleTranslateClient {
    /// Create a new translation client
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("gramconnect/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(GoogleTranslateClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(TranslateConfig::from_env())
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let url = format!("{}/translate_a/single", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            warn!(status = status.as_u16(), "Translation request failed");
            return Err(AdapterError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await.map_err(|e| AdapterError::Decode {
            service: SERVICE,
            message: e.without_url().to_string(),
        })?;

        let translated = parse_translation(&body)?;
        debug!(
            source = detected_language(&body).unwrap_or("unknown"),
            target = target_language,
            "Translation received"
        );
        Ok(translated)
    }
}
