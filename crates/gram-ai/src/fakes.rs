//! Deterministic fakes for the adapter traits (testing only)
//!
//! Provides `FakeTranslator`, `FakeAnalyzer`, and `ScriptedModel` that
//! answer from canned replies and record every call they receive.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::analyzer::Analyzer;
use crate::error::AdapterError;
use crate::gemini::{GenerateRequest, GenerativeModel};
use crate::media::Media;
use crate::translate::Translator;
use crate::Result;

/// Canned behaviour for a single fake call.
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// Answer immediately with this text
    Text(String),
    /// Fail immediately with an HTTP-style error
    Fail(String),
    /// Never answer
    Hang,
    /// Answer after the given delay
    Delayed(Duration, String),
}

impl FakeReply {
    async fn resolve(self) -> Result<String> {
        match self {
            FakeReply::Text(text) => Ok(text),
            FakeReply::Fail(message) => Err(AdapterError::Http(message)),
            FakeReply::Hang => std::future::pending().await,
            FakeReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FakeTranslator
// ---------------------------------------------------------------------------

/// A recorded `translate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateCall {
    pub text: String,
    pub target_language: String,
}

/// Translator that always gives the same reply.
#[derive(Debug)]
pub struct FakeTranslator {
    reply: FakeReply,
    calls: Mutex<Vec<TranslateCall>>,
}

impl FakeTranslator {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(text: &str) -> Self {
        Self::new(FakeReply::Text(text.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(FakeReply::Fail(message.to_string()))
    }

    pub fn hanging() -> Self {
        Self::new(FakeReply::Hang)
    }

    pub fn calls(&self) -> Vec<TranslateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        self.calls.lock().unwrap().push(TranslateCall {
            text: text.to_string(),
            target_language: target_language.to_string(),
        });
        self.reply.clone().resolve().await
    }
}

// ---------------------------------------------------------------------------
// FakeAnalyzer
// ---------------------------------------------------------------------------

/// A recorded `analyze` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeCall {
    pub text: String,
    pub photo_mime: Option<String>,
}

/// Analyzer that always gives the same raw model text.
#[derive(Debug)]
pub struct FakeAnalyzer {
    reply: FakeReply,
    calls: Mutex<Vec<AnalyzeCall>>,
}

impl FakeAnalyzer {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(raw: &str) -> Self {
        Self::new(FakeReply::Text(raw.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(FakeReply::Fail(message.to_string()))
    }

    pub fn hanging() -> Self {
        Self::new(FakeReply::Hang)
    }

    pub fn calls(&self) -> Vec<AnalyzeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Analyzer for FakeAnalyzer {
    async fn analyze(&self, text: &str, photo: Option<&Media>) -> Result<String> {
        self.calls.lock().unwrap().push(AnalyzeCall {
            text: text.to_string(),
            photo_mime: photo.map(|p| p.mime_type.clone()),
        });
        self.reply.clone().resolve().await
    }
}

// ---------------------------------------------------------------------------
// ScriptedModel
// ---------------------------------------------------------------------------

/// Generative model that replays a queue of replies, one per call.
///
/// Calls past the end of the script fail, so an unexpected extra call
/// shows up as an error rather than a silent success.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<FakeReply>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = FakeReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(reply) => reply.resolve().await,
            None => Err(AdapterError::Http("scripted model has no reply left".to_string())),
        }
    }
}
