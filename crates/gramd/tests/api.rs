//! Integration tests for gramd endpoints over fake adapters and stores.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use gram_ai::fakes::{FakeAnalyzer, FakeReply, FakeTranslator, ScriptedModel};
use gram_ai::GenerativeModel;
use gram_core::{PipelineConfig, ReportPipeline, Transcriber};
use gram_store::fakes::{MemoryPhotoStore, MemoryReportStore};
use gram_store::{PhotoStore, ReportStore};
use gramd::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;

struct Harness {
    app: axum::Router,
    reports: Arc<MemoryReportStore>,
    photos: Arc<MemoryPhotoStore>,
    analyzer: Arc<FakeAnalyzer>,
}

fn harness_with(
    analyzer: FakeAnalyzer,
    reports: MemoryReportStore,
    model_replies: Vec<FakeReply>,
) -> Harness {
    let reports = Arc::new(reports);
    let photos = Arc::new(MemoryPhotoStore::new());
    let analyzer = Arc::new(analyzer);
    let pipeline = ReportPipeline::new(
        Arc::new(FakeTranslator::ok("translated text")),
        analyzer.clone(),
        PipelineConfig::default(),
    );
    let model = Arc::new(ScriptedModel::new(model_replies)) as Arc<dyn GenerativeModel>;
    let transcriber = Transcriber::new(model, Duration::from_secs(5));

    let state = AppState::new(
        pipeline,
        reports.clone() as Arc<dyn ReportStore>,
        photos.clone() as Arc<dyn PhotoStore>,
        transcriber,
    );
    Harness {
        app: build_router(state),
        reports,
        photos,
        analyzer,
    }
}

fn harness() -> Harness {
    harness_with(
        FakeAnalyzer::ok(r#"{"explanation":"Hand pump is broken","tags":["Water & Sanitation"]}"#),
        MemoryReportStore::new(),
        Vec::new(),
    )
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// POST /request/create
// =============================================================================

#[tokio::test]
async fn create_report_enriches_and_stores() {
    let h = harness();

    let response = h
        .app
        .oneshot(post_json(
            "/request/create",
            json!({"villagerId": "villager-1", "description": "hand pump toot gaya"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Request submitted successfully!");
    assert_eq!(body["tags"], "Water & Sanitation");
    assert!(body["requestId"].is_string());

    let stored = h.reports.list(10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].description, "Hand pump is broken");
    assert_eq!(stored[0].submitter_id, "villager-1");
    assert_eq!(h.analyzer.calls()[0].text, "translated text");
}

#[tokio::test]
async fn create_report_with_photo_data_url() {
    let h = harness();

    let response = h
        .app
        .oneshot(post_json(
            "/request/create",
            json!({
                "villagerId": "villager-2",
                "description": "road damaged",
                "photo": {"data": "data:image/jpeg;base64,/9j/4AAQ"}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(h.photos.len(), 1);
    assert_eq!(
        h.analyzer.calls()[0].photo_mime.as_deref(),
        Some("image/jpeg")
    );
    let stored = h.reports.list(1).await.unwrap();
    assert!(stored[0].photo_ref.is_some());
}

#[tokio::test]
async fn create_report_missing_fields_is_400() {
    for body in [
        json!({"description": "no villager"}),
        json!({"villagerId": "v-1"}),
        json!({"villagerId": "v-1", "description": "   "}),
        json!({"villagerId": "", "description": "x"}),
    ] {
        let h = harness();
        let response = h
            .app
            .oneshot(post_json("/request/create", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Villager ID and description are required.");
        assert!(h.reports.is_empty());
    }
}

#[tokio::test]
async fn create_report_bad_photo_is_400() {
    let h = harness();

    let response = h
        .app
        .oneshot(post_json(
            "/request/create",
            json!({
                "villagerId": "v-1",
                "description": "x",
                "photo": {"data": "!!!", "mimeType": "image/png"}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.analyzer.call_count(), 0);
    assert!(h.photos.is_empty());
}

#[tokio::test]
async fn create_report_survives_analysis_failure() {
    let h = harness_with(
        FakeAnalyzer::failing("quota exceeded"),
        MemoryReportStore::new(),
        Vec::new(),
    );

    let response = h
        .app
        .oneshot(post_json(
            "/request/create",
            json!({"villagerId": "v-1", "description": "original"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["tags"], Value::Null);

    let stored = h.reports.list(1).await.unwrap();
    assert_eq!(stored[0].description, "translated text");
    assert!(stored[0].tags.is_none());
}

#[tokio::test]
async fn create_report_storage_failure_is_500() {
    let h = harness_with(
        FakeAnalyzer::ok("{}"),
        MemoryReportStore::failing(),
        Vec::new(),
    );

    let response = h
        .app
        .oneshot(post_json(
            "/request/create",
            json!({"villagerId": "v-1", "description": "x"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "An error occurred while saving the request.");
}

#[tokio::test]
async fn failed_insert_leaves_one_photo_across_retries() {
    let h = harness_with(
        FakeAnalyzer::ok("{}"),
        MemoryReportStore::failing(),
        Vec::new(),
    );
    let body = json!({
        "villagerId": "v-1",
        "description": "transformer burnt",
        "photo": {"data": "data:image/png;base64,iVBORw0KGgo="}
    });

    for _ in 0..2 {
        let response = h
            .app
            .clone()
            .oneshot(post_json("/request/create", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    assert!(h.reports.is_empty());
    assert_eq!(h.photos.len(), 1);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/request/create")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
}

// =============================================================================
// GET /requests
// =============================================================================

#[tokio::test]
async fn list_requests_filters_by_tag() {
    let h = harness();
    for description in ["first", "second"] {
        h.app
            .clone()
            .oneshot(post_json(
                "/request/create",
                json!({"villagerId": "v-1", "description": description}),
            ))
            .await
            .unwrap();
    }

    let response = h
        .app
        .clone()
        .oneshot(get("/requests?tag=water%20%26%20sanitation&limit=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);
    assert_eq!(body["requests"][0]["villagerId"], "v-1");

    let response = h.app.oneshot(get("/requests?tag=Education")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["requests"].as_array().unwrap().is_empty());
}

// =============================================================================
// POST /transcribe
// =============================================================================

#[tokio::test]
async fn transcribe_returns_corrected_text() {
    let h = harness_with(
        FakeAnalyzer::ok("{}"),
        MemoryReportStore::new(),
        vec![
            FakeReply::Text("no electricity".to_string()),
            FakeReply::Text("बिजली नहीं है".to_string()),
        ],
    );

    let response = h
        .app
        .oneshot(post_json(
            "/transcribe",
            json!({"audio": "GkXfo59ChoEB", "mimeType": "audio/webm"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["text"], "बिजली नहीं है");
    assert_eq!(body["corrected"], true);
    assert_eq!(body["script"], "devanagari");
}

#[tokio::test]
async fn transcribe_unknown_script_is_400() {
    let h = harness();

    let response = h
        .app
        .oneshot(post_json(
            "/transcribe",
            json!({"audio": "GkXfo59ChoEB", "script": "cyrillic"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transcribe_model_failure_is_502() {
    let h = harness_with(
        FakeAnalyzer::ok("{}"),
        MemoryReportStore::new(),
        vec![FakeReply::Fail("503".to_string())],
    );

    let response = h
        .app
        .oneshot(post_json("/transcribe", json!({"audio": "GkXfo59ChoEB"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// =============================================================================
// GET /health
// =============================================================================

#[tokio::test]
async fn health_reports_module_and_version() {
    let h = harness();

    let response = h.app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "gramd");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
}
