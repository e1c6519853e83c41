//! SurrealReportStore against an in-memory SurrealDB.

use gram_core::{DegradeReason, EnrichmentResult, Photo, PipelineOutcome, SubmitterId, TagList};
use gram_store::{NewReport, PhotoRef, ReportId, ReportStore, StorageError, SurrealReportStore};

fn enriched(explanation: &str, tags: &str) -> PipelineOutcome {
    PipelineOutcome::Enriched(EnrichmentResult {
        explanation: explanation.to_string(),
        tags: TagList::new(tags, 255),
    })
}

#[tokio::test]
async fn insert_then_get_returns_same_record() {
    let store = SurrealReportStore::in_memory().await.unwrap();
    let submitter = SubmitterId::new("villager-1").unwrap();
    let photo_ref = PhotoRef::for_photo(&Photo::new("image/jpeg", vec![1, 2, 3]));

    let inserted = store
        .insert(NewReport::from_outcome(
            &submitter,
            &enriched("Hand pump broken", "Water & Sanitation"),
            Some(photo_ref.clone()),
        ))
        .await
        .unwrap();

    let fetched = store.get(&inserted.report_id).await.unwrap();
    assert_eq!(fetched.submitter_id, "villager-1");
    assert_eq!(fetched.description, "Hand pump broken");
    assert_eq!(fetched.photo_ref, Some(photo_ref));
    assert_eq!(fetched.tags.unwrap().as_str(), "Water & Sanitation");
}

#[tokio::test]
async fn degraded_outcome_is_stored_without_tags() {
    let store = SurrealReportStore::in_memory().await.unwrap();
    let submitter = SubmitterId::new("villager-2").unwrap();
    let outcome = PipelineOutcome::Degraded {
        text: "  बिजली नहीं है ".to_string(),
        reason: DegradeReason::AnalysisFailed("timeout".to_string()),
    };

    let inserted = store
        .insert(NewReport::from_outcome(&submitter, &outcome, None))
        .await
        .unwrap();

    let fetched = store.get(&inserted.report_id).await.unwrap();
    assert_eq!(fetched.description, "  बिजली नहीं है ");
    assert!(fetched.tags.is_none());
    assert!(fetched.photo_ref.is_none());
}

#[tokio::test]
async fn get_unknown_report_is_not_found() {
    let store = SurrealReportStore::in_memory().await.unwrap();
    let err = store.get(&ReportId::new()).await.unwrap_err();
    assert!(matches!(err, StorageError::ReportNotFound { .. }));
}

#[tokio::test]
async fn list_is_newest_first_and_limited() {
    let store = SurrealReportStore::in_memory().await.unwrap();
    let submitter = SubmitterId::new("v").unwrap();
    for text in ["one", "two", "three"] {
        store
            .insert(NewReport::from_outcome(
                &submitter,
                &enriched(text, "Education"),
                None,
            ))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let listed = store.list(2).await.unwrap();
    let descriptions: Vec<_> = listed.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(descriptions, vec!["three", "two"]);
}

#[tokio::test]
async fn list_by_tag_matches_labels_case_insensitively() {
    let store = SurrealReportStore::in_memory().await.unwrap();
    let submitter = SubmitterId::new("v").unwrap();
    store
        .insert(NewReport::from_outcome(
            &submitter,
            &enriched("clinic closed", "Healthcare, Government Services"),
            None,
        ))
        .await
        .unwrap();
    store
        .insert(NewReport::from_outcome(
            &submitter,
            &enriched("school has no staff", "Education"),
            None,
        ))
        .await
        .unwrap();

    let hits = store.list_by_tag("government services", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].description, "clinic closed");

    assert!(store.list_by_tag("Government", 10).await.unwrap().is_empty());
}
