//! Gram-AI: External AI Service Adapters for GramConnect
//!
//! This crate wraps the two external services a report passes through
//! before it is stored: a translation service and a multimodal generative
//! model. Every adapter is a trait so callers can inject deterministic
//! fakes (see [`fakes`]) in place of the network clients.
//!
//! ## Layer 0 - External Services
//!
//! Focus: one attempt per call, typed failures, no interpretation of the
//! model's output.
//!
//! ## Key Components
//!
//! - `Translator` / `GoogleTranslateClient`: text to target language
//! - `GenerativeModel` / `GeminiClient`: multimodal prompt to raw text
//! - `Analyzer` / `ModelAnalyzer`: the report triage prompt on top of a model

pub mod analyzer;
mod error;
pub mod fakes;
pub mod gemini;
pub mod media;
pub mod translate;

pub use analyzer::{triage_prompt, Analyzer, ModelAnalyzer, TAG_VOCABULARY};
pub use error::AdapterError;
pub use gemini::{ContentPart, GeminiClient, GeminiConfig, GenerateRequest, GenerativeModel};
pub use media::{extension_for, Media};
pub use translate::{GoogleTranslateClient, TranslateConfig, Translator};

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;
