//! Error types for gram-store

use thiserror::Error;

/// Errors that can occur in the persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or authentication failed
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Backend query or write failed
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Schema setup failed
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),

    #[error("Report not found: {report_id}")]
    ReportNotFound { report_id: String },

    #[error("Photo not found: {photo_ref}")]
    PhotoNotFound { photo_ref: String },

    /// Photo reference is not `<sha256-hex>.<ext>`
    #[error("Invalid photo reference: {0}")]
    InvalidPhotoRef(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;
