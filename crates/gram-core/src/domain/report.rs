//! Raw report as submitted by a resident.

use serde::{Deserialize, Serialize};

use super::error::ReportError;

/// Photo attached to a report.
pub type Photo = gram_ai::Media;

/// Opaque identifier of the submitting user, supplied by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmitterId(String);

impl SubmitterId {
    pub fn new(id: impl Into<String>) -> Result<Self, ReportError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ReportError::MissingSubmitter);
        }
        Ok(SubmitterId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubmitterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable pipeline input.
///
/// The description is kept exactly as submitted (no trimming), so a fully
/// degraded report stores the user's original bytes.
#[derive(Debug, Clone)]
pub struct RawReport {
    submitter: SubmitterId,
    description: String,
    photo: Option<Photo>,
}

impl RawReport {
    /// Create a report. Fails if the description is blank.
    pub fn new(
        submitter: SubmitterId,
        description: impl Into<String>,
        photo: Option<Photo>,
    ) -> Result<Self, ReportError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ReportError::EmptyDescription);
        }
        Ok(Self {
            submitter,
            description,
            photo,
        })
    }

    pub fn submitter(&self) -> &SubmitterId {
        &self.submitter
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_description_rejected() {
        let submitter = SubmitterId::new("v-1").unwrap();
        let err = RawReport::new(submitter, "  \n ", None).unwrap_err();
        assert!(matches!(err, ReportError::EmptyDescription));
    }

    #[test]
    fn test_description_kept_verbatim() {
        let submitter = SubmitterId::new("v-1").unwrap();
        let report = RawReport::new(submitter, "  पानी नहीं  ", None).unwrap();
        assert_eq!(report.description(), "  पानी नहीं  ");
        assert!(!report.has_photo());
    }

    #[test]
    fn test_blank_submitter_rejected() {
        assert!(matches!(
            SubmitterId::new(" "),
            Err(ReportError::MissingSubmitter)
        ));
    }
}
