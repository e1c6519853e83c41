//! Gram-Core: Report Enrichment Pipeline for GramConnect
//!
//! Turns a raw, possibly non-English problem report into a canonical
//! English explanation and a normalized tag set. Every external call is
//! bounded by a timeout and every failure degrades to the best text
//! available, so a report is never lost.
//!
//! ## Layer 1 - Enrichment
//!
//! ```text
//! Received -> Translating -> Analyzing -> Extracting -> Normalizing -> Persisted
//!                  |              |            |             |
//!                  +------------> Degraded <---+-------------+
//! ```
//!
//! ## Key Components
//!
//! - `ReportPipeline`: the state machine over injected adapters
//! - `extract_object`: recovers a JSON object from chatty model output
//! - `normalize`: resolves key aliases and shapes tags
//! - `Transcriber`: audio to Indic-script text with one corrective call

pub mod config;
pub mod domain;
pub mod extract;
pub mod normalize;
pub mod obs;
pub mod pipeline;
pub mod stage;
pub mod telemetry;
pub mod transcribe;

pub use config::{ConfigError, PipelineConfig};
pub use domain::{
    DegradeReason, EnrichmentResult, Photo, PipelineOutcome, RawReport, ReportError, StageError,
    SubmitterId, TagList, MAX_TAGS_LEN,
};
pub use extract::{extract_object, JsonObject};
pub use normalize::{normalize, Normalized};
pub use pipeline::{PipelineRun, ReportPipeline};
pub use stage::PipelineState;
pub use transcribe::{Script, Transcriber, Transcription, TranscribeError};
