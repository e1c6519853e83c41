//! HTTP error responses.
//!
//! Every failure is rendered as `{"success": false, "message": ...}`.
//! Internal causes are logged, never echoed to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub const MISSING_FIELDS: &str = "Villager ID and description are required.";
pub const SAVE_FAILED: &str = "An error occurred while saving the request.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Client sent something unusable; the message is shown as-is.
    #[error("{0}")]
    BadRequest(String),

    /// Report or photo could not be persisted.
    #[error("storage failure: {0}")]
    Storage(#[from] gram_store::StorageError),

    /// Stored reports could not be read.
    #[error("read failure: {0}")]
    Read(String),

    /// An upstream AI service failed on a call the client waits for.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "request could not be saved");
                (StatusCode::INTERNAL_SERVER_ERROR, SAVE_FAILED.to_string())
            }
            ApiError::Read(err) => {
                tracing::error!(error = %err, "requests could not be loaded");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while loading requests.".to_string(),
                )
            }
            ApiError::Upstream(err) => {
                tracing::error!(error = %err, "upstream service failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "The transcription service is unavailable.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest(MISSING_FIELDS.to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Storage(gram_store::StorageError::Backend("x".to_string()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Upstream("x".to_string()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
