//! SurrealDB-backed ReportStore implementation

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::error::{StorageError, StorageResult};
use crate::migrations;
use crate::schema::ReportRow;
use crate::storage_traits::{NewReport, ReportId, ReportRecord, ReportStore};

/// Default on-disk database used when `GRAM_DB_URL` is not set.
pub const DEFAULT_DB_URL: &str = "surrealkv://.gramconnect/db";

/// Connection settings for the report database
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `mem://`, `surrealkv://<path>`, or `ws://host:port`
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials for remote servers
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("GRAM_DB_URL").unwrap_or_else(|_| DEFAULT_DB_URL.to_string()),
            namespace: std::env::var("GRAM_DB_NS").unwrap_or_else(|_| "gramconnect".to_string()),
            database: std::env::var("GRAM_DB_NAME").unwrap_or_else(|_| "main".to_string()),
            username: std::env::var("GRAM_DB_USER").ok(),
            password: std::env::var("GRAM_DB_PASS").ok(),
        }
    }
}

impl DbConfig {
    /// Read `GRAM_DB_URL`, `GRAM_DB_NS`, `GRAM_DB_NAME`, `GRAM_DB_USER`, `GRAM_DB_PASS`.
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: "gramconnect".to_string(),
            database: "main".to_string(),
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    /// Local directory backing a `surrealkv://` URL, if any.
    fn local_path(&self) -> Option<&str> {
        self.url.strip_prefix("surrealkv://")
    }
}

/// SurrealDB-backed implementation of [`ReportStore`].
pub struct SurrealReportStore {
    db: Surreal<Any>,
}

impl SurrealReportStore {
    /// Create an in-memory instance for testing.
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect(DbConfig::new("mem://")).await
    }

    /// Connect using environment configuration.
    pub async fn from_env() -> StorageResult<Self> {
        Self::connect(DbConfig::from_env()).await
    }

    /// Connect, authenticate if credentials are set, and initialize the schema.
    pub async fn connect(config: DbConfig) -> StorageResult<Self> {
        if let Some(path) = config.local_path() {
            std::fs::create_dir_all(path).map_err(|e| {
                StorageError::Connection(format!(
                    "Failed to create database directory {}: {}",
                    path, e
                ))
            })?;
        }

        let db = surrealdb::engine::any::connect(config.url.as_str())
            .await
            .map_err(|e| {
                StorageError::Connection(format!("Failed to connect to {}: {}", config.url, e))
            })?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await
            .map_err(|e| StorageError::Connection(format!("Root auth failed: {e}")))?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;

        info!(url = %config.url, "SurrealReportStore connected");
        Ok(Self { db })
    }

    async fn query_rows(
        &self,
        sql: String,
        binding: Option<(&'static str, String)>,
    ) -> StorageResult<Vec<ReportRecord>> {
        let mut query = self.db.query(sql);
        if let Some(binding) = binding {
            query = query.bind(binding);
        }
        let mut res = query
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<ReportRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter().map(ReportRow::into_record).collect()
    }
}

#[async_trait]
impl ReportStore for SurrealReportStore {
    #[instrument(skip(self, report), fields(submitter = %report.submitter_id))]
    async fn insert(&self, report: NewReport) -> StorageResult<ReportRecord> {
        let record = ReportRecord::from_new(report);
        let row = ReportRow::from_record(&record);

        debug!(report_id = %record.report_id, "creating report");

        let created: Option<ReportRow> = self
            .db
            .create("reports")
            .content(row)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match created {
            Some(row) => row.into_record(),
            None => Err(StorageError::Backend(
                "Failed to create report".to_string(),
            )),
        }
    }

    async fn get(&self, report_id: &ReportId) -> StorageResult<ReportRecord> {
        let rows = self
            .query_rows(
                "SELECT * FROM reports WHERE report_id = $rid".to_string(),
                Some(("rid", report_id.as_str().to_string())),
            )
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StorageError::ReportNotFound {
                report_id: report_id.to_string(),
            })
    }

    async fn list(&self, limit: usize) -> StorageResult<Vec<ReportRecord>> {
        self.query_rows(
            format!("SELECT * FROM reports ORDER BY created_at DESC LIMIT {limit}"),
            None,
        )
        .await
    }

    async fn list_by_tag(&self, tag: &str, limit: usize) -> StorageResult<Vec<ReportRecord>> {
        self.query_rows(
            format!(
                "SELECT * FROM reports WHERE tag_index CONTAINS $tag ORDER BY created_at DESC LIMIT {limit}"
            ),
            Some(("tag", tag.trim().to_lowercase())),
        )
        .await
    }
}
