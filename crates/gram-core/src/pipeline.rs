//! Report enrichment pipeline.
//!
//! Drives a [`RawReport`] through translation, analysis, extraction and
//! normalization. Every stage failure is converted into a fallback
//! transition, so a run always ends with a [`PipelineOutcome`].

use std::sync::Arc;
use std::time::Instant;

use gram_ai::{Analyzer, Translator};
use serde::Serialize;
use tracing::Instrument;

use crate::config::PipelineConfig;
use crate::domain::{DegradeReason, EnrichmentResult, PipelineOutcome, RawReport, StageError};
use crate::extract::extract_object;
use crate::normalize::normalize;
use crate::obs;
use crate::stage::{bounded, PipelineState};

/// Outcome of a run together with the path it took.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub outcome: PipelineOutcome,
    /// States visited, starting at `Received` and ending at a terminal state.
    pub states: Vec<PipelineState>,
    /// Stage failures caught along the way.
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<StageError>,
}

fn serialize_errors<S: serde::Serializer>(
    errors: &[StageError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

impl PipelineRun {
    pub fn final_state(&self) -> PipelineState {
        self.states
            .last()
            .copied()
            .unwrap_or(PipelineState::Received)
    }
}

struct Trace {
    states: Vec<PipelineState>,
    errors: Vec<StageError>,
}

impl Trace {
    fn new() -> Self {
        Self {
            states: vec![PipelineState::Received],
            errors: Vec::new(),
        }
    }

    fn current(&self) -> PipelineState {
        self.states
            .last()
            .copied()
            .unwrap_or(PipelineState::Received)
    }

    fn enter(&mut self, next: PipelineState) {
        debug_assert!(
            self.current().can_transition_to(next),
            "illegal transition {} -> {}",
            self.current(),
            next
        );
        if !next.is_terminal() {
            obs::emit_stage_entered(next);
        }
        self.states.push(next);
    }

    fn fail(&mut self, error: StageError) {
        obs::emit_stage_failed(self.current(), error.kind(), &error);
        self.errors.push(error);
    }

    fn finish(self, outcome: PipelineOutcome, started: Instant) -> PipelineRun {
        obs::emit_report_finished(&outcome, started.elapsed().as_millis() as u64);
        PipelineRun {
            outcome,
            states: self.states,
            errors: self.errors,
        }
    }
}

/// Enrichment pipeline over injected adapters.
///
/// Cheap to share: the adapters are reference-counted and the pipeline
/// holds no per-report state.
#[derive(Clone)]
pub struct ReportPipeline {
    translator: Arc<dyn Translator>,
    analyzer: Arc<dyn Analyzer>,
    config: PipelineConfig,
}

impl std::fmt::Debug for ReportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReportPipeline {
    pub fn new(
        translator: Arc<dyn Translator>,
        analyzer: Arc<dyn Analyzer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            translator,
            analyzer,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Enrich one report. Never fails.
    pub async fn run(&self, report: &RawReport) -> PipelineOutcome {
        self.run_traced(report).await.outcome
    }

    /// Enrich one report and return the states and errors along the way.
    pub async fn run_traced(&self, report: &RawReport) -> PipelineRun {
        let span = obs::report_span(report.submitter().as_str());
        self.drive(report).instrument(span).await
    }

    async fn drive(&self, report: &RawReport) -> PipelineRun {
        let started = Instant::now();
        obs::emit_report_received(
            report.submitter().as_str(),
            report.description().chars().count(),
            report.has_photo(),
        );

        let mut trace = Trace::new();
        let original = report.description();

        let translated = if self.config.translate {
            trace.enter(PipelineState::Translating);
            self.translate(original, &mut trace).await
        } else {
            None
        };
        let best_text = translated.unwrap_or_else(|| original.to_string());

        if !report.has_photo() && !self.config.analyze_text_only {
            trace.enter(PipelineState::Persisted);
            let outcome = PipelineOutcome::Degraded {
                text: best_text,
                reason: DegradeReason::AnalysisSkipped,
            };
            return trace.finish(outcome, started);
        }

        trace.enter(PipelineState::Analyzing);
        let raw = match bounded(
            "analyze",
            self.config.analyze_timeout(),
            self.analyzer.analyze(&best_text, report.photo()),
        )
        .await
        {
            Ok(raw) => raw,
            Err(err) => {
                let cause = err.to_string();
                trace.fail(StageError::AnalysisFailed(cause.clone()));
                trace.enter(PipelineState::Degraded);
                let outcome = PipelineOutcome::Degraded {
                    text: best_text,
                    reason: DegradeReason::AnalysisFailed(cause),
                };
                return trace.finish(outcome, started);
            }
        };

        trace.enter(PipelineState::Extracting);
        let Some(object) = extract_object(&raw) else {
            trace.fail(StageError::ExtractionEmpty);
            trace.enter(PipelineState::Degraded);
            let outcome = PipelineOutcome::Degraded {
                text: best_text,
                reason: DegradeReason::ExtractionEmpty,
            };
            return trace.finish(outcome, started);
        };

        trace.enter(PipelineState::Normalizing);
        let normalized = normalize(&object, self.config.max_tags_len);
        let nothing_usable = normalized.is_empty();
        for issue in normalized.issues {
            trace.fail(issue);
        }

        if nothing_usable {
            trace.enter(PipelineState::Degraded);
            let outcome = PipelineOutcome::Degraded {
                text: best_text,
                reason: DegradeReason::NormalizationIncomplete,
            };
            return trace.finish(outcome, started);
        }

        trace.enter(PipelineState::Persisted);
        let outcome = PipelineOutcome::Enriched(EnrichmentResult {
            explanation: normalized.explanation.unwrap_or(best_text),
            tags: normalized.tags,
        });
        trace.finish(outcome, started)
    }

    /// One translation attempt. `None` means keep the original text.
    async fn translate(&self, text: &str, trace: &mut Trace) -> Option<String> {
        let result = bounded(
            "translate",
            self.config.translate_timeout(),
            self.translator
                .translate(text, &self.config.target_language),
        )
        .await;

        match result {
            Ok(translated) if !translated.trim().is_empty() => Some(translated),
            Ok(_) => {
                trace.fail(StageError::TranslationFailed(
                    "empty translation".to_string(),
                ));
                None
            }
            Err(err) => {
                trace.fail(StageError::TranslationFailed(err.to_string()));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubmitterId;
    use gram_ai::fakes::{FakeAnalyzer, FakeTranslator};

    fn report(text: &str) -> RawReport {
        RawReport::new(SubmitterId::new("v-1").unwrap(), text, None).unwrap()
    }

    #[tokio::test]
    async fn test_happy_path_states() {
        let pipeline = ReportPipeline::new(
            Arc::new(FakeTranslator::ok("no water")),
            Arc::new(FakeAnalyzer::ok(r#"{"explanation":"E","tags":["Water"]}"#)),
            PipelineConfig::default(),
        );

        let run = pipeline.run_traced(&report("paani nahi")).await;

        assert_eq!(
            run.states,
            vec![
                PipelineState::Received,
                PipelineState::Translating,
                PipelineState::Analyzing,
                PipelineState::Extracting,
                PipelineState::Normalizing,
                PipelineState::Persisted,
            ]
        );
        assert!(run.errors.is_empty());
        assert_eq!(run.outcome.explanation(), "E");
    }

    #[tokio::test]
    async fn test_translation_disabled_skips_translator() {
        let translator = Arc::new(FakeTranslator::ok("unused"));
        let analyzer = Arc::new(FakeAnalyzer::ok(r#"{"tags":"Education"}"#));
        let pipeline = ReportPipeline::new(
            translator.clone(),
            analyzer.clone(),
            PipelineConfig::default().with_translate(false),
        );

        let outcome = pipeline.run(&report("school roof leaks")).await;

        assert_eq!(translator.call_count(), 0);
        assert_eq!(analyzer.calls()[0].text, "school roof leaks");
        assert_eq!(outcome.explanation(), "school roof leaks");
        assert_eq!(outcome.tags().unwrap().as_str(), "Education");
    }

    #[tokio::test]
    async fn test_empty_translation_falls_back_to_original() {
        let analyzer = Arc::new(FakeAnalyzer::failing("down"));
        let pipeline = ReportPipeline::new(
            Arc::new(FakeTranslator::ok("   ")),
            analyzer.clone(),
            PipelineConfig::default(),
        );

        let run = pipeline.run_traced(&report("original")).await;

        assert_eq!(analyzer.calls()[0].text, "original");
        assert_eq!(run.outcome.explanation(), "original");
        assert_eq!(run.errors.len(), 2);
    }

    #[tokio::test]
    async fn test_run_serializes() {
        let pipeline = ReportPipeline::new(
            Arc::new(FakeTranslator::failing("x")),
            Arc::new(FakeAnalyzer::ok("nope")),
            PipelineConfig::default(),
        );
        let run = pipeline.run_traced(&report("r")).await;
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["outcome"]["status"], "degraded");
        assert_eq!(json["states"][0], "received");
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
    }
}
