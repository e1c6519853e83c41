//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryReportStore` and `MemoryPhotoStore` that satisfy the
//! trait contracts without any external dependencies.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use gram_core::Photo;

use crate::error::{StorageError, StorageResult};
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryReportStore
// ---------------------------------------------------------------------------

/// In-memory report store. Insertion order stands in for `created_at`.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: Mutex<Vec<ReportRecord>>,
    fail_inserts: bool,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose inserts always fail, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
            fail_inserts: true,
        }
    }

    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, report: NewReport) -> StorageResult<ReportRecord> {
        if self.fail_inserts {
            return Err(StorageError::Backend("insert rejected".to_string()));
        }
        let record = ReportRecord::from_new(report);
        self.reports.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn get(&self, report_id: &ReportId) -> StorageResult<ReportRecord> {
        let reports = self.reports.lock().unwrap();
        reports
            .iter()
            .find(|r| &r.report_id == report_id)
            .cloned()
            .ok_or_else(|| StorageError::ReportNotFound {
                report_id: report_id.to_string(),
            })
    }

    async fn list(&self, limit: usize) -> StorageResult<Vec<ReportRecord>> {
        let reports = self.reports.lock().unwrap();
        Ok(reports.iter().rev().take(limit).cloned().collect())
    }

    async fn list_by_tag(&self, tag: &str, limit: usize) -> StorageResult<Vec<ReportRecord>> {
        let reports = self.reports.lock().unwrap();
        Ok(reports
            .iter()
            .rev()
            .filter(|r| r.has_tag(tag))
            .take(limit)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryPhotoStore
// ---------------------------------------------------------------------------

/// In-memory photo store backed by a `HashMap<ref, bytes>`.
#[derive(Debug, Default)]
pub struct MemoryPhotoStore {
    photos: Mutex<HashMap<PhotoRef, Vec<u8>>>,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.photos.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn put(&self, photo: &Photo) -> StorageResult<PhotoRef> {
        let photo_ref = PhotoRef::for_photo(photo);
        self.photos
            .lock()
            .unwrap()
            .insert(photo_ref.clone(), photo.bytes.clone());
        Ok(photo_ref)
    }

    async fn get(&self, photo_ref: &PhotoRef) -> StorageResult<Photo> {
        let photos = self.photos.lock().unwrap();
        photos
            .get(photo_ref)
            .map(|bytes| Photo::new(photo_ref.mime_type(), bytes.clone()))
            .ok_or_else(|| StorageError::PhotoNotFound {
                photo_ref: photo_ref.to_string(),
            })
    }

    async fn contains(&self, photo_ref: &PhotoRef) -> StorageResult<bool> {
        Ok(self.photos.lock().unwrap().contains_key(photo_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gram_core::TagList;

    fn new_report(description: &str, tags: Option<&str>) -> NewReport {
        NewReport {
            submitter_id: "v-1".to_string(),
            description: description.to_string(),
            photo_ref: None,
            tags: tags.and_then(|t| TagList::new(t, 255)),
        }
    }

    #[tokio::test]
    async fn test_memory_report_store_newest_first() {
        let store = MemoryReportStore::new();
        store.insert(new_report("first", None)).await.unwrap();
        store.insert(new_report("second", None)).await.unwrap();

        let listed = store.list(10).await.unwrap();
        assert_eq!(listed[0].description, "second");
        assert_eq!(listed[1].description, "first");
        assert_eq!(store.list(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_report_store_tag_filter() {
        let store = MemoryReportStore::new();
        store
            .insert(new_report("a", Some("Water & Sanitation, Healthcare")))
            .await
            .unwrap();
        store.insert(new_report("b", Some("Education"))).await.unwrap();
        store.insert(new_report("c", None)).await.unwrap();

        let hits = store.list_by_tag("healthcare", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].description, "a");
    }

    #[tokio::test]
    async fn test_memory_report_store_get_missing() {
        let store = MemoryReportStore::new();
        let err = store.get(&ReportId::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::ReportNotFound { .. }));
    }

    #[tokio::test]
    async fn test_failing_store_rejects_inserts() {
        let store = MemoryReportStore::failing();
        assert!(store.insert(new_report("x", None)).await.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_memory_photo_store_dedupes() {
        let store = MemoryPhotoStore::new();
        let photo = Photo::new("image/jpeg", vec![0xFF, 0xD8]);

        let r1 = store.put(&photo).await.unwrap();
        let r2 = store.put(&photo).await.unwrap();

        assert_eq!(r1, r2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&r1).await.unwrap(), photo);
    }
}
