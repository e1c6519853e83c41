//! Pipeline configuration.
//!
//! Loaded from the `[pipeline]` table of an optional TOML file; every field
//! has a default so an absent file or table is valid.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MAX_TAGS_LEN;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Knobs for one `ReportPipeline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Translate the description before analysis.
    pub translate: bool,

    /// Language code translation targets.
    pub target_language: String,

    /// Analyze reports that carry no photo.
    pub analyze_text_only: bool,

    pub translate_timeout_ms: u64,
    pub analyze_timeout_ms: u64,
    pub transcribe_timeout_ms: u64,

    /// Cap on the stored tag string, in characters.
    pub max_tags_len: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            translate: true,
            target_language: "en".to_string(),
            analyze_text_only: true,
            translate_timeout_ms: 10_000,
            analyze_timeout_ms: 30_000,
            transcribe_timeout_ms: 30_000,
            max_tags_len: MAX_TAGS_LEN,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    pipeline: PipelineConfig,
}

impl PipelineConfig {
    /// Parse the `[pipeline]` table of a TOML document and validate it.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(source)?;
        file.pipeline.validate()?;
        Ok(file.pipeline)
    }

    /// Load from a file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_language.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "target_language",
                reason: "must not be empty".to_string(),
            });
        }
        for (field, value) in [
            ("translate_timeout_ms", self.translate_timeout_ms),
            ("analyze_timeout_ms", self.analyze_timeout_ms),
            ("transcribe_timeout_ms", self.transcribe_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if self.max_tags_len == 0 {
            return Err(ConfigError::Invalid {
                field: "max_tags_len",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_translate(mut self, translate: bool) -> Self {
        self.translate = translate;
        self
    }

    pub fn with_analyze_text_only(mut self, analyze: bool) -> Self {
        self.analyze_text_only = analyze;
        self
    }

    pub fn with_timeouts(mut self, translate: Duration, analyze: Duration) -> Self {
        self.translate_timeout_ms = translate.as_millis() as u64;
        self.analyze_timeout_ms = analyze.as_millis() as u64;
        self
    }

    pub fn translate_timeout(&self) -> Duration {
        Duration::from_millis(self.translate_timeout_ms)
    }

    pub fn analyze_timeout(&self) -> Duration {
        Duration::from_millis(self.analyze_timeout_ms)
    }

    pub fn transcribe_timeout(&self) -> Duration {
        Duration::from_millis(self.transcribe_timeout_ms)
    }
}
