use super::schema::{evaluation_schema, parse_evaluation, SCHEMA_NAME};
use crate::errors::PipelineError;
use crate::judge::Judge;
use crate::model::EvaluationResult;
use crate::providers::llm::ResponseSchema;

pub(crate) async fn call_judge_impl(
    judge: &Judge,
    transcript: &str,
    summary: &str,
) -> Result<EvaluationResult, PipelineError> {
    let prompt = super::prompt::build_prompt(transcript, summary);
    let system = [super::prompt::system_prompt(judge.config.hijack_defense)];
    let schema = ResponseSchema {
        name: SCHEMA_NAME,
        schema: evaluation_schema(),
    };

    let resp = judge
        .client
        .complete_structured(&prompt, Some(&system), schema)
        .await
        .map_err(|e| PipelineError::evaluation(format!("{e:#}")))?;

    if resp.text.trim().is_empty() {
        return Err(PipelineError::evaluation("judge returned no payload"));
    }

    let result = parse_evaluation(&resp.text)?;
    tracing::info!(
        provider = %resp.provider,
        model = %resp.model,
        overall_score = result.overall_score,
        "summary evaluated"
    );
    Ok(result)
}
