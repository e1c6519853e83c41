//! SurrealDB schema initialization
//!
//! Safe to call on every connect: all statements are `IF NOT EXISTS`.

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Initialize all GramConnect tables.
pub async fn init_schema(db: &Surreal<Any>) -> StorageResult<()> {
    info!("Initializing GramConnect SurrealDB schema");
    init_reports_table(db).await?;
    info!("GramConnect schema initialization complete");
    Ok(())
}

/// Initialize the `reports` table.
///
/// ```text
/// TABLE reports {
///   report_id:    STRING (unique)
///   submitter_id: STRING (indexed)
///   description:  STRING
///   photo_ref:    STRING?
///   tags:         STRING?  (", "-joined, at most 255 chars)
///   tag_index:    ARRAY<STRING> (lowercased labels)
///   created_at:   DATETIME (indexed)
/// }
/// ```
///
/// Reports are append-only; deletes are not permitted.
async fn init_reports_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("Initializing reports table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS reports AS
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE INDEX IF NOT EXISTS idx_report_id ON TABLE reports COLUMNS report_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_submitter_id ON TABLE reports COLUMNS submitter_id;
        DEFINE INDEX IF NOT EXISTS idx_tag_index ON TABLE reports COLUMNS tag_index;
        DEFINE INDEX IF NOT EXISTS idx_created_at ON TABLE reports COLUMNS created_at;
    "#;

    db.query(sql)
        .await
        .and_then(|response| response.check())
        .map_err(|e| StorageError::SchemaSetup(e.to_string()))?;
    info!("reports table initialized");
    Ok(())
}
