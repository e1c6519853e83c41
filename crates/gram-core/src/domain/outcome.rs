//! Pipeline output: enrichment result or degraded fallback.

use serde::{Deserialize, Serialize};

/// Storage column width for tags.
pub const MAX_TAGS_LEN: usize = 255;

/// Normalized tag string: labels joined with `", "`, never empty, never
/// longer than the configured cap (counted in characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagList(String);

impl TagList {
    /// Build a tag list from an already-joined string.
    ///
    /// The input is trimmed and cut to at most `max_len` characters without
    /// splitting a character. Returns `None` when nothing is left.
    pub fn new(joined: &str, max_len: usize) -> Option<Self> {
        let trimmed = joined.trim();
        let capped = match trimmed.char_indices().nth(max_len) {
            Some((byte_idx, _)) => &trimmed[..byte_idx],
            None => trimmed,
        };
        if capped.is_empty() {
            None
        } else {
            Some(TagList(capped.to_string()))
        }
    }

    /// Join labels with `", "`, skipping blank ones.
    pub fn from_labels<I, S>(labels: I, max_len: usize) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = labels
            .into_iter()
            .filter_map(|l| {
                let l = l.as_ref().trim();
                (!l.is_empty()).then(|| l.to_string())
            })
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(&joined, max_len)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into individual labels.
    pub fn labels(&self) -> Vec<&str> {
        self.0
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }

    /// Case-insensitive label membership.
    pub fn contains_label(&self, label: &str) -> bool {
        let wanted = label.trim().to_lowercase();
        self.labels().iter().any(|l| l.to_lowercase() == wanted)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TagList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Successful enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub explanation: String,
    pub tags: Option<TagList>,
}

/// Why a report was stored without full enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DegradeReason {
    AnalysisFailed(String),
    ExtractionEmpty,
    NormalizationIncomplete,
    AnalysisSkipped,
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradeReason::AnalysisFailed(cause) => write!(f, "analysis failed: {cause}"),
            DegradeReason::ExtractionEmpty => f.write_str("no structured result"),
            DegradeReason::NormalizationIncomplete => f.write_str("no usable field"),
            DegradeReason::AnalysisSkipped => f.write_str("analysis skipped"),
        }
    }
}

/// Result of one pipeline run. Always produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Enriched(EnrichmentResult),
    Degraded { text: String, reason: DegradeReason },
}

impl PipelineOutcome {
    /// Text to persist as the report description.
    pub fn explanation(&self) -> &str {
        match self {
            PipelineOutcome::Enriched(result) => &result.explanation,
            PipelineOutcome::Degraded { text, .. } => text,
        }
    }

    pub fn tags(&self) -> Option<&TagList> {
        match self {
            PipelineOutcome::Enriched(result) => result.tags.as_ref(),
            PipelineOutcome::Degraded { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, PipelineOutcome::Degraded { .. })
    }

    pub fn degrade_reason(&self) -> Option<&DegradeReason> {
        match self {
            PipelineOutcome::Degraded { reason, .. } => Some(reason),
            PipelineOutcome::Enriched(_) => None,
        }
    }
}
