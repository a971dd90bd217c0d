//! Transcript → structured markdown summary.
//!
//! The summary is expected to carry a notes section and an action-item
//! section. Nothing here checks that; the judge scores it.

mod prompt;

use crate::errors::PipelineError;
use crate::providers::llm::LlmClient;
use std::sync::Arc;

pub use prompt::{ACTIONS_HEADER, NOTES_HEADER};

#[derive(Clone)]
pub struct SummaryGenerator {
    client: Arc<dyn LlmClient>,
}

impl SummaryGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// One remote call, no retry.
    pub async fn generate(&self, transcript: &str) -> Result<String, PipelineError> {
        let prompt = prompt::build_prompt(transcript);
        let system = [prompt::system_prompt()];

        let resp = self
            .client
            .complete(&prompt, Some(&system))
            .await
            .map_err(|e| PipelineError::generation(format!("{e:#}")))?;

        if resp.text.trim().is_empty() {
            return Err(PipelineError::generation("model returned no text"));
        }
        tracing::info!(
            provider = %resp.provider,
            model = %resp.model,
            summary_chars = resp.text.chars().count(),
            "summary generated"
        );
        Ok(resp.text)
    }
}
