//! SurrealDB row types
//!
//! Rows use plain strings; conversion to the typed records in
//! `storage_traits` happens at the store boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};
use crate::storage_traits::{PhotoRef, ReportId, ReportRecord};
use gram_core::TagList;

/// Serialize chrono DateTime as a SurrealDB datetime
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Report row stored in the `reports` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    /// SurrealDB record ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<surrealdb::sql::Thing>,
    pub report_id: String,
    pub submitter_id: String,
    pub description: String,
    pub photo_ref: Option<String>,
    pub tags: Option<String>,
    /// Lowercased tag labels, indexed for tag lookups
    pub tag_index: Vec<String>,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ReportRow {
    pub fn from_record(record: &ReportRecord) -> Self {
        let tag_index = record
            .tags
            .as_ref()
            .map(|t| t.labels().iter().map(|l| l.to_lowercase()).collect())
            .unwrap_or_default();
        Self {
            id: None,
            report_id: record.report_id.as_str().to_string(),
            submitter_id: record.submitter_id.clone(),
            description: record.description.clone(),
            photo_ref: record.photo_ref.as_ref().map(|p| p.to_string()),
            tags: record.tags.as_ref().map(|t| t.as_str().to_string()),
            tag_index,
            created_at: record.created_at,
        }
    }

    pub fn into_record(self) -> StorageResult<ReportRecord> {
        let photo_ref = self.photo_ref.map(PhotoRef::try_from).transpose()?;
        // Stored tags were already capped on the way in.
        let tags = self.tags.and_then(|t| TagList::new(&t, usize::MAX));
        if self.report_id.is_empty() {
            return Err(StorageError::Backend("report row without report_id".to_string()));
        }
        Ok(ReportRecord {
            report_id: ReportId(self.report_id),
            submitter_id: self.submitter_id,
            description: self.description,
            photo_ref,
            tags,
            created_at: self.created_at,
        })
    }
}
