//! Error types for gram-ai

use thiserror::Error;

/// Errors that can occur while talking to an external AI service
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Service is missing required configuration (e.g. an API key)
    #[error("{service} is not configured: {reason}")]
    NotConfigured {
        service: &'static str,
        reason: String,
    },

    /// Transport-level failure (DNS, TLS, connection reset, ...)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Service answered with a non-success status
    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Call did not finish within the caller-supplied deadline
    #[error("{service} timed out after {timeout_ms} ms")]
    Timeout {
        service: &'static str,
        timeout_ms: u64,
    },

    /// Service refused to produce an answer (safety block, no candidates)
    #[error("{service} declined to answer: {reason}")]
    Declined {
        service: &'static str,
        reason: String,
    },

    /// Service answered but the answer carried no text
    #[error("{service} returned an empty response")]
    EmptyResponse { service: &'static str },

    /// Response body did not have the expected shape
    #[error("Failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// Inline media could not be decoded
    #[error("Invalid media: {0}")]
    InvalidMedia(String),
}

/// The request URL is dropped: it can carry user text or credentials.
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        AdapterError::Http(err.without_url().to_string())
    }
}
