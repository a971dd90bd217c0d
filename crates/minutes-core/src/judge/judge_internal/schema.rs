use crate::errors::PipelineError;
use crate::model::{EvaluationResult, MetricName};
use jsonschema::Draft;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

pub(crate) const SCHEMA_NAME: &str = "evaluation_result";

const FENCE: &str = "```";

static SCHEMA: OnceLock<Value> = OnceLock::new();
static VALIDATOR: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// The response schema: four metrics plus the overall fields, all required.
/// Extra keys are allowed and ignored downstream.
pub(crate) fn evaluation_schema() -> &'static Value {
    SCHEMA.get_or_init(|| {
        let metric = json!({
            "type": "object",
            "properties": {
                "score": { "type": "number", "description": "Score from 1-10." },
                "reasoning": { "type": "string" }
            },
            "required": ["score", "reasoning"]
        });

        let mut properties = Map::new();
        let mut required = Vec::new();
        for name in MetricName::ALL {
            let mut m = metric.clone();
            m["properties"]["reasoning"]["description"] =
                Value::String(format!("Specific examples about {}.", name.focus()));
            properties.insert(name.as_str().to_string(), m);
            required.push(Value::String(name.as_str().to_string()));
        }
        properties.insert(
            "overallScore".to_string(),
            json!({ "type": "number", "description": "Overall quality score 1-10." }),
        );
        properties.insert(
            "overallComment".to_string(),
            json!({ "type": "string", "description": "Final verdict summary." }),
        );
        required.push(json!("overallScore"));
        required.push(json!("overallComment"));

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    })
}

fn compiled_validator() -> Result<&'static jsonschema::Validator, PipelineError> {
    VALIDATOR
        .get_or_init(|| {
            jsonschema::options()
                .with_draft(Draft::Draft202012)
                .build(evaluation_schema())
                .map_err(|e| format!("failed to compile evaluation schema: {e}"))
        })
        .as_ref()
        .map_err(|e| PipelineError::evaluation(e.clone()))
}

/// Remove decorative code fences around a payload.
///
/// Handles a leading ```` ``` ```` or ```` ```json ```` marker and a trailing
/// ```` ``` ````, repeatedly, then trims surrounding whitespace. A payload
/// without fences only gets trimmed, so applying this twice changes nothing.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let mut changed = false;
        if let Some(rest) = text.strip_prefix(FENCE) {
            text = match rest.find('\n') {
                Some(nl) if rest[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
                    &rest[nl + 1..]
                }
                _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
            };
            changed = true;
        }
        if let Some(rest) = text.trim_end().strip_suffix(FENCE) {
            text = rest;
            changed = true;
        }
        text = text.trim();
        if !changed {
            return text;
        }
    }
}

/// Fence-strip, parse, validate against the schema, then deserialize.
/// Any failure is an `EvaluationFailure`; nothing partial escapes.
pub(crate) fn parse_evaluation(raw: &str) -> Result<EvaluationResult, PipelineError> {
    let cleaned = strip_fences(raw);
    if cleaned.is_empty() {
        return Err(PipelineError::evaluation("judge returned no payload"));
    }

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| PipelineError::evaluation(format!("judge payload is not JSON: {e}")))?;

    validate_payload(&value)?;

    serde_json::from_value(value)
        .map_err(|e| PipelineError::evaluation(format!("judge payload has the wrong shape: {e}")))
}

pub(crate) fn validate_payload(instance: &Value) -> Result<(), PipelineError> {
    let v = compiled_validator()?;
    if v.is_valid(instance) {
        return Ok(());
    }

    const MAX_ERRORS: usize = 5;
    let lines: Vec<String> = v
        .iter_errors(instance)
        .take(MAX_ERRORS)
        .map(|e| e.to_string())
        .collect();
    Err(PipelineError::evaluation(format!(
        "judge payload violates schema: {}",
        lines.join("; ")
    )))
}
