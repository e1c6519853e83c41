//! Storage trait definitions for GramConnect
//!
//! - `ReportStore`: enriched (or degraded) report persistence
//! - `PhotoStore`: content-addressed photo blobs
//!
//! Both traits are async and backend-agnostic. In-memory fakes live in
//! the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gram_core::{Photo, PipelineOutcome, SubmitterId, TagList};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{StorageError, StorageResult};

// ---------------------------------------------------------------------------
// ReportStore
// ---------------------------------------------------------------------------

/// Unique identifier of a stored report
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl ReportId {
    /// Generate a new random ReportId
    pub fn new() -> Self {
        ReportId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four fields written for every report, enriched or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReport {
    pub submitter_id: String,
    pub description: String,
    pub photo_ref: Option<PhotoRef>,
    pub tags: Option<TagList>,
}

impl NewReport {
    /// Map a pipeline outcome onto the stored fields.
    ///
    /// Both outcome kinds go through here, so degraded reports are stored
    /// the same way as enriched ones.
    pub fn from_outcome(
        submitter: &SubmitterId,
        outcome: &PipelineOutcome,
        photo_ref: Option<PhotoRef>,
    ) -> Self {
        Self {
            submitter_id: submitter.as_str().to_string(),
            description: outcome.explanation().to_string(),
            photo_ref,
            tags: outcome.tags().cloned(),
        }
    }
}

/// A persisted report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report_id: ReportId,
    pub submitter_id: String,
    pub description: String,
    pub photo_ref: Option<PhotoRef>,
    pub tags: Option<TagList>,
    pub created_at: DateTime<Utc>,
}

impl ReportRecord {
    pub fn from_new(report: NewReport) -> Self {
        Self {
            report_id: ReportId::new(),
            submitter_id: report.submitter_id,
            description: report.description,
            photo_ref: report.photo_ref,
            tags: report.tags,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive match against the individual tag labels.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_ref()
            .map(|tags| tags.contains_label(tag))
            .unwrap_or(false)
    }
}

/// Report persistence.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist a report and return the stored record.
    async fn insert(&self, report: NewReport) -> StorageResult<ReportRecord>;

    /// Fetch one report. Returns `StorageError::ReportNotFound` if absent.
    async fn get(&self, report_id: &ReportId) -> StorageResult<ReportRecord>;

    /// Most recent reports first.
    async fn list(&self, limit: usize) -> StorageResult<Vec<ReportRecord>>;

    /// Most recent reports carrying `tag`, compared case-insensitively.
    async fn list_by_tag(&self, tag: &str, limit: usize) -> StorageResult<Vec<ReportRecord>>;
}

// ---------------------------------------------------------------------------
// PhotoStore
// ---------------------------------------------------------------------------

/// Reference to a stored photo: `<sha256-hex>.<extension>`.
///
/// Fields are private so a reference is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoRef {
    digest: String,
    extension: String,
}

impl PhotoRef {
    /// Reference for a photo's content.
    pub fn for_photo(photo: &Photo) -> Self {
        use sha2::Digest;
        let mut hasher = Sha256::new();
        hasher.update(&photo.bytes);
        PhotoRef {
            digest: hex::encode(hasher.finalize()),
            extension: photo.extension().to_string(),
        }
    }

    /// Full hex digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.digest[..12]
    }

    /// MIME type implied by the extension.
    pub fn mime_type(&self) -> &'static str {
        mime_for_extension(&self.extension)
    }
}

impl TryFrom<String> for PhotoRef {
    type Error = StorageError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let (digest, extension) = s
            .split_once('.')
            .ok_or_else(|| StorageError::InvalidPhotoRef(s.clone()))?;
        let valid_digest = digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit());
        let valid_ext = !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid_digest || !valid_ext {
            return Err(StorageError::InvalidPhotoRef(s));
        }
        Ok(PhotoRef {
            digest: digest.to_ascii_lowercase(),
            extension: extension.to_ascii_lowercase(),
        })
    }
}

impl std::str::FromStr for PhotoRef {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhotoRef::try_from(s.to_string())
    }
}

impl From<PhotoRef> for String {
    fn from(r: PhotoRef) -> Self {
        r.to_string()
    }
}

impl std::fmt::Display for PhotoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.digest, self.extension)
    }
}

/// Inverse of `gram_ai::extension_for` for the image types we store.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "webm" => "audio/webm",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// Content-addressed photo store.
///
/// Guarantees:
/// - `put(photo)` returns a reference derived from the photo's bytes.
/// - Storing the same bytes twice yields the same reference.
/// - `get(ref)` returns the exact bytes previously stored.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn put(&self, photo: &Photo) -> StorageResult<PhotoRef>;

    /// Returns `StorageError::PhotoNotFound` if absent.
    async fn get(&self, photo_ref: &PhotoRef) -> StorageResult<Photo>;

    async fn contains(&self, photo_ref: &PhotoRef) -> StorageResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use gram_core::{DegradeReason, EnrichmentResult};

    #[test]
    fn test_photo_ref_roundtrip_through_string() {
        let photo = Photo::new("image/png", vec![1, 2, 3]);
        let r = PhotoRef::for_photo(&photo);
        assert_eq!(r.extension(), "png");
        assert_eq!(r.mime_type(), "image/png");

        let parsed: PhotoRef = r.to_string().parse().unwrap();
        assert_eq!(parsed, r);
    }

    #[test]
    fn test_photo_ref_rejects_garbage() {
        assert!("nope".parse::<PhotoRef>().is_err());
        assert!(format!("{}.jpg", "z".repeat(64)).parse::<PhotoRef>().is_err());
        assert!(format!("{}.", "a".repeat(64)).parse::<PhotoRef>().is_err());
        assert!(format!("{}.j/g", "a".repeat(64)).parse::<PhotoRef>().is_err());
    }

    #[test]
    fn test_photo_ref_serializes_as_string() {
        let r = PhotoRef::for_photo(&Photo::new("image/jpeg", vec![9]));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json, serde_json::Value::String(r.to_string()));
        let back: PhotoRef = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_new_report_from_enriched_outcome() {
        let submitter = SubmitterId::new("v-3").unwrap();
        let outcome = PipelineOutcome::Enriched(EnrichmentResult {
            explanation: "Broken pump".to_string(),
            tags: TagList::new("Water & Sanitation", 255),
        });

        let report = NewReport::from_outcome(&submitter, &outcome, None);

        assert_eq!(report.submitter_id, "v-3");
        assert_eq!(report.description, "Broken pump");
        assert_eq!(report.tags.unwrap().as_str(), "Water & Sanitation");
    }

    #[test]
    fn test_new_report_from_degraded_outcome() {
        let submitter = SubmitterId::new("v-3").unwrap();
        let outcome = PipelineOutcome::Degraded {
            text: "original".to_string(),
            reason: DegradeReason::ExtractionEmpty,
        };

        let report = NewReport::from_outcome(&submitter, &outcome, None);

        assert_eq!(report.description, "original");
        assert!(report.tags.is_none());
    }
}
