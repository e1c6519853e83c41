//! Gram-Store: Persistence for GramConnect
//!
//! Stores enriched (or degraded) reports and the photos attached to them.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: one write path for every pipeline outcome, append-only reports,
//! content-addressed photos.
//!
//! ## Key Components
//!
//! - `ReportStore` / `SurrealReportStore`: report rows in SurrealDB
//! - `PhotoStore` / `FsPhotoStore`: photos on disk, keyed by SHA-256
//! - `fakes`: in-memory implementations of both traits

mod error;
pub mod fakes;
pub mod migrations;
mod photos;
mod schema;
pub mod storage_traits;
pub mod surreal_reports;

pub use error::{StorageError, StorageResult};
pub use photos::FsPhotoStore;
pub use storage_traits::{
    mime_for_extension, NewReport, PhotoRef, PhotoStore, ReportId, ReportRecord, ReportStore,
};
pub use surreal_reports::{DbConfig, SurrealReportStore, DEFAULT_DB_URL};
