//! gramd library - report intake service
//!
//! Accepts problem reports from the web client, runs them through the
//! enrichment pipeline and stores the result. Also exposes the voice
//! transcription helper used by the report form.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use gram_core::{ReportPipeline, Transcriber};
use gram_store::{PhotoStore, ReportStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::ApiError;

/// Photos arrive base64-encoded inside JSON, so the limit covers the encoded size.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReportPipeline>,
    pub reports: Arc<dyn ReportStore>,
    pub photos: Arc<dyn PhotoStore>,
    pub transcriber: Arc<Transcriber>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        pipeline: ReportPipeline,
        reports: Arc<dyn ReportStore>,
        photos: Arc<dyn PhotoStore>,
        transcriber: Transcriber,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            reports,
            photos,
            transcriber: Arc::new(transcriber),
            started_at: Instant::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::report_routes())
        .merge(api::transcribe_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
