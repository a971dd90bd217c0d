mod judge_internal;

use crate::errors::PipelineError;
use crate::model::EvaluationResult;
use crate::providers::llm::LlmClient;
use std::sync::Arc;

pub use judge_internal::schema::strip_fences;

#[derive(Clone, Debug)]
pub struct JudgeRuntimeConfig {
    pub hijack_defense: bool,
}

impl Default for JudgeRuntimeConfig {
    fn default() -> Self {
        Self {
            hijack_defense: true,
        }
    }
}

impl From<&crate::config::JudgeConfig> for JudgeRuntimeConfig {
    fn from(cfg: &crate::config::JudgeConfig) -> Self {
        Self {
            hijack_defense: cfg.hijack_defense,
        }
    }
}

/// Scores a summary against its transcript on the four rubric dimensions.
///
/// The response is requested under a fixed JSON schema and validated against
/// that same schema locally before it becomes an [`EvaluationResult`]. One
/// remote call per evaluation, no retry.
#[derive(Clone)]
pub struct Judge {
    config: JudgeRuntimeConfig,
    client: Arc<dyn LlmClient>,
}

impl Judge {
    pub fn new(config: JudgeRuntimeConfig, client: Arc<dyn LlmClient>) -> Self {
        Self { config, client }
    }

    pub async fn evaluate(
        &self,
        transcript: &str,
        summary: &str,
    ) -> Result<EvaluationResult, PipelineError> {
        judge_internal::client::call_judge_impl(self, transcript, summary).await
    }

    /// Parse a raw judge payload exactly as [`Judge::evaluate`] does.
    pub fn parse_payload(raw: &str) -> Result<EvaluationResult, PipelineError> {
        judge_internal::schema::parse_evaluation(raw)
    }
}
