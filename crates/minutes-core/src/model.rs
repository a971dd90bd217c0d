//! Scorecard data: metrics, the judge verdict, and raw provider replies.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One scored rubric dimension.
///
/// `score` is expected in `1..=10` but is stored exactly as received or
/// entered, so out-of-range values stay visible to whoever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(deserialize_with = "deserialize_score")]
    pub score: i64,
    pub reasoning: String,
}

impl Metric {
    pub fn new(score: i64, reasoning: impl Into<String>) -> Self {
        Self {
            score,
            reasoning: reasoning.into(),
        }
    }

    /// Number of filled cells in a 10-cell score bar.
    pub fn bar_fill(&self) -> u8 {
        bar_fill(self.score)
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.score)
    }
}

/// Score clamped to `[0, 10]` for rendering. The stored value is untouched.
pub fn bar_fill(score: i64) -> u8 {
    score.clamp(0, 10) as u8
}

/// Parse a user-entered score. Non-numeric input becomes `0`; numeric input
/// is kept verbatim, including values outside `1..=10`.
pub fn parse_score_input(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return n;
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => f.trunc() as i64,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
}

impl ScoreBand {
    pub fn of(score: i64) -> Self {
        if score >= 8 {
            ScoreBand::Strong
        } else if score >= 5 {
            ScoreBand::Fair
        } else {
            ScoreBand::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Strong => "strong",
            ScoreBand::Fair => "fair",
            ScoreBand::Weak => "weak",
        }
    }
}

/// The closed set of rubric dimensions a judge scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    Accuracy,
    Completeness,
    Coverage,
    Structure,
}

impl MetricName {
    pub const ALL: [MetricName; 4] = [
        MetricName::Accuracy,
        MetricName::Completeness,
        MetricName::Coverage,
        MetricName::Structure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Accuracy => "accuracy",
            MetricName::Completeness => "completeness",
            MetricName::Coverage => "coverage",
            MetricName::Structure => "structure",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricName::Accuracy => "Accuracy",
            MetricName::Completeness => "Completeness",
            MetricName::Coverage => "Coverage",
            MetricName::Structure => "Structure",
        }
    }

    /// What the dimension judges. Completeness is about missing detail,
    /// coverage about missing topics.
    pub fn focus(&self) -> &'static str {
        match self {
            MetricName::Accuracy => "hallucinations and attribution of claims and tasks to speakers",
            MetricName::Completeness => "omitted decisions, dates, numbers and agreed tasks",
            MetricName::Coverage => "breadth and balance across the distinct discussion threads",
            MetricName::Structure => "expected section headers and clean formatting",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accuracy" => Ok(MetricName::Accuracy),
            "completeness" => Ok(MetricName::Completeness),
            "coverage" => Ok(MetricName::Coverage),
            "structure" => Ok(MetricName::Structure),
            other => Err(format!(
                "unknown metric '{}' (expected accuracy, completeness, coverage or structure)",
                other
            )),
        }
    }
}

/// The judge's full verdict. Every field is required on the wire; unknown
/// keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub accuracy: Metric,
    pub completeness: Metric,
    pub coverage: Metric,
    pub structure: Metric,
    #[serde(deserialize_with = "deserialize_score")]
    pub overall_score: i64,
    pub overall_comment: String,
}

impl EvaluationResult {
    pub fn metric(&self, name: MetricName) -> &Metric {
        match name {
            MetricName::Accuracy => &self.accuracy,
            MetricName::Completeness => &self.completeness,
            MetricName::Coverage => &self.coverage,
            MetricName::Structure => &self.structure,
        }
    }

    pub fn metric_mut(&mut self, name: MetricName) -> &mut Metric {
        match name {
            MetricName::Accuracy => &mut self.accuracy,
            MetricName::Completeness => &mut self.completeness,
            MetricName::Coverage => &mut self.coverage,
            MetricName::Structure => &mut self.structure,
        }
    }

    pub fn metrics(&self) -> impl Iterator<Item = (MetricName, &Metric)> + '_ {
        MetricName::ALL.into_iter().map(move |n| (n, self.metric(n)))
    }
}

/// Scores arrive as JSON numbers; integral floats (and the occasional
/// `7.5`) are rounded to the nearest integer.
fn deserialize_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => Ok(f.round() as i64),
        _ => Err(serde::de::Error::custom(format!(
            "score is not a finite number: {}",
            n
        ))),
    }
}

/// Raw completion returned by an LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> serde_json::Value {
        json!({
            "accuracy": {"score": 9, "reasoning": "owners correct"},
            "completeness": {"score": 7, "reasoning": "date missing"},
            "coverage": {"score": 8, "reasoning": "both threads"},
            "structure": {"score": 10, "reasoning": "both headers present"},
            "overallScore": 8,
            "overallComment": "solid"
        })
    }

    #[test]
    fn deserializes_camel_case_overall_fields() {
        let eval: EvaluationResult = serde_json::from_value(full_payload()).unwrap();
        assert_eq!(eval.overall_score, 8);
        assert_eq!(eval.overall_comment, "solid");
        assert_eq!(eval.metric(MetricName::Structure).score, 10);
    }

    #[test]
    fn ignores_additional_keys() {
        let mut payload = full_payload();
        payload["confidence"] = json!("high");
        payload["accuracy"]["evidence"] = json!(["line 3"]);
        let eval: EvaluationResult = serde_json::from_value(payload).unwrap();
        assert_eq!(eval.accuracy.score, 9);
    }

    #[test]
    fn float_scores_round_and_out_of_range_is_kept() {
        let mut payload = full_payload();
        payload["coverage"]["score"] = json!(6.6);
        payload["overallScore"] = json!(14);
        let eval: EvaluationResult = serde_json::from_value(payload).unwrap();
        assert_eq!(eval.coverage.score, 7);
        assert_eq!(eval.overall_score, 14);
    }

    #[test]
    fn missing_reasoning_is_rejected() {
        let mut payload = full_payload();
        payload["completeness"].as_object_mut().unwrap().remove("reasoning");
        assert!(serde_json::from_value::<EvaluationResult>(payload).is_err());
    }

    #[test]
    fn bar_fill_clamps_only_for_display() {
        let m = Metric::new(13, "");
        assert_eq!(m.bar_fill(), 10);
        assert_eq!(m.score, 13);
        assert_eq!(Metric::new(-2, "").bar_fill(), 0);
    }

    #[test]
    fn score_input_parsing() {
        assert_eq!(parse_score_input("9"), 9);
        assert_eq!(parse_score_input(" 12 "), 12);
        assert_eq!(parse_score_input("-1"), -1);
        assert_eq!(parse_score_input("7.9"), 7);
        assert_eq!(parse_score_input("nine"), 0);
        assert_eq!(parse_score_input(""), 0);
    }

    #[test]
    fn bands() {
        assert_eq!(ScoreBand::of(8), ScoreBand::Strong);
        assert_eq!(ScoreBand::of(5), ScoreBand::Fair);
        assert_eq!(ScoreBand::of(4), ScoreBand::Weak);
    }

    #[test]
    fn metric_name_round_trips_through_str() {
        for name in MetricName::ALL {
            assert_eq!(name.as_str().parse::<MetricName>().unwrap(), name);
        }
        assert!("tone".parse::<MetricName>().is_err());
    }
}
