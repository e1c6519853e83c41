//! Report triage analyzer
//!
//! Wraps a [`GenerativeModel`] with the fixed triage prompt. The analyzer
//! only produces raw model text; recovering structure from it is the
//! caller's job, since the model is not bound to emit clean JSON.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::gemini::{GenerateRequest, GenerativeModel};
use crate::media::Media;
use crate::Result;

/// Controlled tag vocabulary offered to the model.
pub const TAG_VOCABULARY: [&str; 10] = [
    "Agriculture",
    "Healthcare",
    "Education",
    "Electricity",
    "Water & Sanitation",
    "Infrastructure",
    "Government Services",
    "Environment",
    "Safety & Security",
    "Livelihood",
];

/// Build the triage prompt for one report.
pub fn triage_prompt(text: &str) -> String {
    let vocabulary = TAG_VOCABULARY.join(", ");
    format!(
        r#"You are an expert analyst for a rural development platform. Your task is to analyze a problem reported by a user, which includes text and may include an image.

User's Text: "{text}"

Analyze the provided text and any accompanying image to perform the following tasks:

1.  **Generate Problem Overview (explanation):**
    * Write a detailed, professional explanation of the problem in ENGLISH.
    * First, clearly identify the core issue (e.g., "A severe drought," "A broken electricity transformer," "A damaged road," "Lack of medical supplies").
    * Second, describe the **immediate or potential impact** of this problem on the user, their livelihood, or their community.

2.  **Generate Categorical Tags (tags):**
    * Provide a list of comma-separated tags in ENGLISH.
    * These tags must be high-level categories suitable for filtering and categorization.
    * Choose from the following list where applicable: **{vocabulary}**.
    * If the problem fits another major category, you may add it.

3.  **Output Format:**
    * You **MUST** format the entire response as a single, valid JSON object.
    * The JSON object must have exactly two keys: "explanation" (for the overview) and "tags" (for the comma-separated string).
    * **Do not include** markdown code fences or any other text outside of the JSON object itself.

Example Input Text: "school ki chhat toot gayi hai" (with an image of a broken school roof)
Example Output:
{{
  "explanation": "The user is reporting a damaged school building. The image confirms that the roof of the structure has collapsed or is severely broken. The impact of this problem is significant, as it creates an unsafe learning environment and likely prevents children from attending classes, disrupting their education.",
  "tags": "Education, Infrastructure, Safety & Security"
}}"#
    )
}

/// Produces raw triage text for a report description and optional photo.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, text: &str, photo: Option<&Media>) -> Result<String>;
}

/// [`Analyzer`] backed by any generative model.
pub struct ModelAnalyzer {
    model: Arc<dyn GenerativeModel>,
}

impl ModelAnalyzer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Assemble the request: prompt first, then the photo if any.
    pub fn build_request(text: &str, photo: Option<&Media>) -> GenerateRequest {
        let request = GenerateRequest::text(triage_prompt(text));
        match photo {
            Some(photo) => request.with_media(photo.clone()),
            None => request,
        }
    }
}

#[async_trait]
impl Analyzer for ModelAnalyzer {
    async fn analyze(&self, text: &str, photo: Option<&Media>) -> Result<String> {
        let request = Self::build_request(text, photo);
        debug!(with_photo = photo.is_some(), "Requesting triage analysis");
        self.model.generate(&request).await
    }
}
