//! Voice-note transcription endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{routing::post, Json, Router};
use gram_core::{Script, TranscribeError};
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeRequest {
    /// Base64 audio, as recorded by the browser
    pub audio: String,
    #[serde(default = "default_audio_mime")]
    pub mime_type: String,
    /// Script or language name; Devanagari when absent
    pub script: Option<String>,
}

fn default_audio_mime() -> String {
    "audio/webm".to_string()
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub success: bool,
    pub text: String,
    pub corrected: bool,
    pub script: Script,
}

/// POST /transcribe
pub async fn transcribe(
    State(state): State<AppState>,
    payload: Result<Json<TranscribeRequest>, JsonRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let script = match request.script.as_deref() {
        Some(name) => name
            .parse::<Script>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Script::default(),
    };

    let transcription = state
        .transcriber
        .transcribe(&request.audio, &request.mime_type, script)
        .await
        .map_err(|e| match e {
            TranscribeError::InvalidAudio(_) | TranscribeError::UnknownScript(_) => {
                ApiError::BadRequest(e.to_string())
            }
            TranscribeError::Transcription(_) => ApiError::Upstream(e.to_string()),
        })?;

    Ok(Json(TranscribeResponse {
        success: true,
        text: transcription.text,
        corrected: transcription.corrected,
        script,
    }))
}

pub fn transcribe_routes() -> Router<AppState> {
    Router::new().route("/transcribe", post(transcribe))
}
