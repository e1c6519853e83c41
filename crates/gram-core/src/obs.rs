//! Structured lifecycle events for report enrichment.
//!
//! Every event carries an `event` field so log pipelines can filter on it.
//! Stage failures are logged at `warn!`; everything else at `info!`.

use tracing::{info, warn};

use crate::domain::PipelineOutcome;
use crate::stage::PipelineState;

/// RAII guard that enters a report-scoped span for the duration of a run.
///
/// ```ignore
/// let _span = ReportSpan::enter("villager-42");
/// // every event below is tagged with submitter = villager-42
/// ```
pub struct ReportSpan {
    _span: tracing::span::EnteredSpan,
}

impl ReportSpan {
    pub fn enter(submitter: &str) -> Self {
        Self {
            _span: report_span(submitter).entered(),
        }
    }
}

/// Span for one report. Async callers attach it with `Instrument`, since an
/// entered span must not be held across an await.
pub fn report_span(submitter: &str) -> tracing::Span {
    tracing::info_span!("gram.report", submitter = %submitter)
}

pub fn emit_report_received(submitter: &str, description_chars: usize, has_photo: bool) {
    info!(
        event = "report.received",
        submitter = %submitter,
        description_chars = description_chars,
        has_photo = has_photo,
    );
}

pub fn emit_stage_entered(state: PipelineState) {
    info!(event = "stage.entered", state = %state);
}

/// A stage failed and the pipeline is taking its fallback path.
pub fn emit_stage_failed(state: PipelineState, kind: &str, error: &dyn std::fmt::Display) {
    warn!(event = "stage.failed", state = %state, kind = %kind, error = %error);
}

pub fn emit_report_finished(outcome: &PipelineOutcome, duration_ms: u64) {
    let reason = outcome
        .degrade_reason()
        .map(|r| r.to_string())
        .unwrap_or_default();
    info!(
        event = "report.finished",
        degraded = outcome.is_degraded(),
        reason = %reason,
        tags = %outcome.tags().map(|t| t.as_str()).unwrap_or(""),
        duration_ms = duration_ms,
    );
}

/// The transcription was outside the target script and a corrective call ran.
pub fn emit_transcription_corrected(script: &str, succeeded: bool) {
    info!(
        event = "transcription.corrected",
        script = %script,
        succeeded = succeeded,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DegradeReason;
    use tracing_test::traced_test;

    #[test]
    fn test_report_span_create() {
        let _span = ReportSpan::enter("v-1");
    }

    #[traced_test]
    #[test]
    fn test_stage_failed_is_logged() {
        emit_stage_failed(PipelineState::Translating, "translation_failed", &"boom");
        assert!(logs_contain("stage.failed"));
        assert!(logs_contain("translation_failed"));
    }

    #[traced_test]
    #[test]
    fn test_report_finished_carries_reason() {
        let outcome = PipelineOutcome::Degraded {
            text: "t".to_string(),
            reason: DegradeReason::ExtractionEmpty,
        };
        emit_report_finished(&outcome, 12);
        assert!(logs_contain("report.finished"));
        assert!(logs_contain("no structured result"));
    }
}
