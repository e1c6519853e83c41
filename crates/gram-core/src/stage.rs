//! Pipeline states and the bounded external-call helper.

use std::future::Future;
use std::time::Duration;

use gram_ai::AdapterError;
use serde::{Deserialize, Serialize};

/// States a report passes through while being enriched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Received,
    Translating,
    Analyzing,
    Extracting,
    Normalizing,
    /// Terminal: the outcome is ready to be written.
    Persisted,
    /// Terminal: a stage failed and the best available text is kept.
    Degraded,
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Received => "received",
            PipelineState::Translating => "translating",
            PipelineState::Analyzing => "analyzing",
            PipelineState::Extracting => "extracting",
            PipelineState::Normalizing => "normalizing",
            PipelineState::Persisted => "persisted",
            PipelineState::Degraded => "degraded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Persisted | PipelineState::Degraded)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Received, Translating)
                | (Received, Analyzing)
                | (Received, Persisted)
                | (Translating, Analyzing)
                | (Translating, Persisted)
                | (Translating, Degraded)
                | (Analyzing, Extracting)
                | (Analyzing, Degraded)
                | (Extracting, Normalizing)
                | (Extracting, Degraded)
                | (Normalizing, Persisted)
                | (Normalizing, Degraded)
        )
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Run an external call under a deadline.
///
/// An expired call is dropped and reported as [`AdapterError::Timeout`], the
/// same as any other service failure.
pub async fn bounded<T, F>(service: &'static str, limit: Duration, call: F) -> gram_ai::Result<T>
where
    F: Future<Output = gram_ai::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AdapterError::Timeout {
            service,
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}
