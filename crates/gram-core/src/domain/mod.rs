//! Domain models for GramConnect reports.
//!
//! - `RawReport`: immutable pipeline input
//! - `PipelineOutcome`: enriched or degraded result, always produced
//! - `StageError`: stage failures caught inside the pipeline

pub mod error;
pub mod outcome;
pub mod report;

pub use error::{ReportError, StageError};
pub use outcome::{DegradeReason, EnrichmentResult, PipelineOutcome, TagList, MAX_TAGS_LEN};
pub use report::{Photo, RawReport, SubmitterId};
