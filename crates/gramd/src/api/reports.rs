//! Report intake and listing endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use gram_core::{Photo, RawReport, SubmitterId};
use gram_store::{NewReport, ReportRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::MISSING_FIELDS;
use crate::{ApiError, AppState};

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct PhotoPayload {
    /// Base64 payload or a `data:` URL
    pub data: String,
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub villager_id: Option<String>,
    pub description: Option<String>,
    pub photo: Option<PhotoPayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportResponse {
    pub success: bool,
    pub message: String,
    pub request_id: String,
    pub tags: Option<String>,
}

/// POST /request/create
///
/// Stores the photo, enriches the description and persists the report.
/// Enrichment never fails the request; only storage does.
pub async fn create_report(
    State(state): State<AppState>,
    payload: Result<Json<CreateReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateReportResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let missing = || ApiError::BadRequest(MISSING_FIELDS.to_string());
    let submitter = SubmitterId::new(request.villager_id.unwrap_or_default())
        .map_err(|_| missing())?;
    let description = request.description.unwrap_or_default();
    if description.trim().is_empty() {
        return Err(missing());
    }

    let photo = request
        .photo
        .map(|p| Photo::decode(&p.data, p.mime_type.as_deref()))
        .transpose()
        .map_err(|e| ApiError::BadRequest(format!("Invalid photo: {e}")))?;

    let report = RawReport::new(submitter.clone(), description, photo).map_err(|_| missing())?;

    // Photo first: a stored report never points at a missing photo. If the
    // insert fails the photo stays behind, keyed by its digest, and a retry
    // of the same upload reuses it.
    let photo_ref = match report.photo() {
        Some(photo) => Some(state.photos.put(photo).await?),
        None => None,
    };

    let outcome = state.pipeline.run(&report).await;
    let record = state
        .reports
        .insert(NewReport::from_outcome(&submitter, &outcome, photo_ref))
        .await?;

    info!(
        request_id = %record.report_id,
        degraded = outcome.is_degraded(),
        "request saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateReportResponse {
            success: true,
            message: "Request submitted successfully!".to_string(),
            request_id: record.report_id.to_string(),
            tags: record.tags.map(|t| t.into_string()),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub tag: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub request_id: String,
    pub villager_id: String,
    pub description: String,
    pub photo_ref: Option<String>,
    pub tags: Option<String>,
    pub created_at: String,
}

impl From<ReportRecord> for ReportView {
    fn from(record: ReportRecord) -> Self {
        Self {
            created_at: record.created_at.to_rfc3339(),
            request_id: record.report_id.to_string(),
            villager_id: record.submitter_id,
            description: record.description,
            photo_ref: record.photo_ref.map(|p| p.to_string()),
            tags: record.tags.map(|t| t.into_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListReportsResponse {
    pub success: bool,
    pub requests: Vec<ReportView>,
}

/// GET /requests?tag=&limit=
pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListReportsResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let records = match params.tag.as_deref().map(str::trim) {
        Some(tag) if !tag.is_empty() => state.reports.list_by_tag(tag, limit).await,
        _ => state.reports.list(limit).await,
    }
    .map_err(|e| ApiError::Read(e.to_string()))?;

    Ok(Json(ListReportsResponse {
        success: true,
        requests: records.into_iter().map(ReportView::from).collect(),
    }))
}

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/request/create", post(create_report))
        .route("/requests", get(list_reports))
}
