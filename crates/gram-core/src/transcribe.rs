//! Voice-note transcription with a single script-correcting fallback.
//!
//! The model is asked to transcribe straight into the target script. If the
//! answer contains no character of that script (the model answered in
//! English or transliterated), one follow-up call asks it to translate the
//! transcription. The follow-up is never repeated.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use gram_ai::{AdapterError, GenerateRequest, GenerativeModel, Media};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::obs;
use crate::stage::bounded;

/// Errors from the transcription cascade.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("invalid audio: {0}")]
    InvalidAudio(String),

    #[error("transcription failed: {0}")]
    Transcription(#[source] AdapterError),

    #[error("unknown script '{0}'")]
    UnknownScript(String),
}

/// Indic scripts the transcriber can target.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    #[default]
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
}

impl Script {
    pub const ALL: [Script; 8] = [
        Script::Devanagari,
        Script::Bengali,
        Script::Gurmukhi,
        Script::Gujarati,
        Script::Tamil,
        Script::Telugu,
        Script::Kannada,
        Script::Malayalam,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Script::Devanagari => "Devanagari",
            Script::Bengali => "Bengali",
            Script::Gurmukhi => "Gurmukhi",
            Script::Gujarati => "Gujarati",
            Script::Tamil => "Tamil",
            Script::Telugu => "Telugu",
            Script::Kannada => "Kannada",
            Script::Malayalam => "Malayalam",
        }
    }

    /// Language written in this script, with its native name.
    pub fn language(&self) -> &'static str {
        match self {
            Script::Devanagari => "Hindi (हिन्दी)",
            Script::Bengali => "Bengali (বাংলা)",
            Script::Gurmukhi => "Punjabi (ਪੰਜਾਬੀ)",
            Script::Gujarati => "Gujarati (ગુજરાતી)",
            Script::Tamil => "Tamil (தமிழ்)",
            Script::Telugu => "Telugu (తెలుగు)",
            Script::Kannada => "Kannada (ಕನ್ನಡ)",
            Script::Malayalam => "Malayalam (മലയാളം)",
        }
    }

    /// Unicode block of the script.
    pub fn range(&self) -> std::ops::RangeInclusive<char> {
        match self {
            Script::Devanagari => '\u{0900}'..='\u{097F}',
            Script::Bengali => '\u{0980}'..='\u{09FF}',
            Script::Gurmukhi => '\u{0A00}'..='\u{0A7F}',
            Script::Gujarati => '\u{0A80}'..='\u{0AFF}',
            Script::Tamil => '\u{0B80}'..='\u{0BFF}',
            Script::Telugu => '\u{0C00}'..='\u{0C7F}',
            Script::Kannada => '\u{0C80}'..='\u{0CFF}',
            Script::Malayalam => '\u{0D00}'..='\u{0D7F}',
        }
    }

    /// True if any character of `text` belongs to this script.
    pub fn contains(&self, text: &str) -> bool {
        let range = self.range();
        text.chars().any(|c| range.contains(&c))
    }

    fn transcribe_prompt(&self) -> String {
        format!(
            "Transcribe the following audio and return the transcription in {} using {} script. \
             Only output the transcription text without any extra commentary:",
            self.language(),
            self.name()
        )
    }

    fn correction_prompt(&self, text: &str) -> String {
        format!(
            "Translate the following text to {} ({}). Return only the translated text:\n\n{}",
            self.language(),
            self.name(),
            text
        )
    }
}

impl FromStr for Script {
    type Err = TranscribeError;

    /// Accepts the script name or the language name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let by_language = match wanted.as_str() {
            "hindi" => Some(Script::Devanagari),
            "punjabi" => Some(Script::Gurmukhi),
            _ => None,
        };
        by_language
            .or_else(|| {
                Script::ALL
                    .into_iter()
                    .find(|script| script.name().to_lowercase() == wanted)
            })
            .ok_or_else(|| TranscribeError::UnknownScript(s.to_string()))
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcription {
    pub text: String,
    /// The corrective translation ran and its output was used.
    pub corrected: bool,
}

/// Audio-to-text helper on top of a multimodal model.
#[derive(Clone)]
pub struct Transcriber {
    model: Arc<dyn GenerativeModel>,
    timeout: Duration,
}

impl Transcriber {
    pub fn new(model: Arc<dyn GenerativeModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Transcribe base64 audio into `script`.
    pub async fn transcribe(
        &self,
        audio_base64: &str,
        mime_type: &str,
        script: Script,
    ) -> Result<Transcription, TranscribeError> {
        let audio = Media::from_base64(audio_base64, mime_type)
            .map_err(|e| TranscribeError::InvalidAudio(e.to_string()))?;

        let request = GenerateRequest::text(script.transcribe_prompt()).with_media(audio);
        let text = bounded("transcribe", self.timeout, self.model.generate(&request))
            .await
            .map_err(TranscribeError::Transcription)?
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(TranscribeError::Transcription(AdapterError::EmptyResponse {
                service: "transcribe",
            }));
        }

        if script.contains(&text) {
            return Ok(Transcription {
                text,
                corrected: false,
            });
        }

        let request = GenerateRequest::text(script.correction_prompt(&text));
        match bounded("transcribe", self.timeout, self.model.generate(&request)).await {
            Ok(translated) if !translated.trim().is_empty() => {
                obs::emit_transcription_corrected(script.name(), true);
                Ok(Transcription {
                    text: translated.trim().to_string(),
                    corrected: true,
                })
            }
            Ok(_) => {
                obs::emit_transcription_corrected(script.name(), false);
                tracing::warn!("corrective translation was empty, keeping original transcription");
                Ok(Transcription {
                    text,
                    corrected: false,
                })
            }
            Err(err) => {
                obs::emit_transcription_corrected(script.name(), false);
                tracing::warn!(error = %err, "corrective translation failed, keeping original transcription");
                Ok(Transcription {
                    text,
                    corrected: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_detection() {
        assert!(Script::Devanagari.contains("पानी नहीं आ रहा"));
        assert!(!Script::Devanagari.contains("water is not coming"));
        assert!(Script::Tamil.contains("தண்ணீர்"));
        assert!(!Script::Tamil.contains("पानी"));
        assert!(Script::Devanagari.contains("mixed पानी text"));
    }

    #[test]
    fn test_script_from_str() {
        assert_eq!("hindi".parse::<Script>().unwrap(), Script::Devanagari);
        assert_eq!("Gurmukhi".parse::<Script>().unwrap(), Script::Gurmukhi);
        assert_eq!(" TAMIL ".parse::<Script>().unwrap(), Script::Tamil);
        assert!("klingon".parse::<Script>().is_err());
    }

    #[test]
    fn test_prompts_name_language() {
        let prompt = Script::Devanagari.transcribe_prompt();
        assert!(prompt.contains("Hindi (हिन्दी)"));
        assert!(prompt.contains("Devanagari"));
        assert!(Script::Bengali
            .correction_prompt("hello")
            .ends_with("hello"));
    }

    #[test]
    fn test_default_script() {
        assert_eq!(Script::default(), Script::Devanagari);
    }
}
