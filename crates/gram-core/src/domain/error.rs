//! Error taxonomy for the enrichment pipeline.

/// Errors raised while building a [`super::RawReport`].
///
/// These belong to the upload layer: they are the only failures a user sees.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report description must not be empty")]
    EmptyDescription,

    #[error("submitter id must not be empty")]
    MissingSubmitter,
}

/// Stage failures inside the pipeline.
///
/// Each one is caught at its stage boundary and turned into a fallback
/// transition; none of them escapes `ReportPipeline::run`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("translation failed: {0}")]
    TranslationFailed(String),

    #[error("analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("model output contained no structured result")]
    ExtractionEmpty,

    #[error("field '{field}' present but unusable")]
    NormalizationIncomplete { field: &'static str },
}

impl StageError {
    /// Short machine-readable name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StageError::TranslationFailed(_) => "translation_failed",
            StageError::AnalysisFailed(_) => "analysis_failed",
            StageError::ExtractionEmpty => "extraction_empty",
            StageError::NormalizationIncomplete { .. } => "normalization_incomplete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_display() {
        let err = StageError::TranslationFailed("timeout".to_string());
        assert!(err.to_string().contains("translation failed"));

        let err = StageError::NormalizationIncomplete { field: "tags" };
        assert_eq!(err.to_string(), "field 'tags' present but unusable");
        assert_eq!(err.kind(), "normalization_incomplete");
    }

    #[test]
    fn test_report_error_display() {
        assert!(ReportError::EmptyDescription
            .to_string()
            .contains("description"));
    }
}
