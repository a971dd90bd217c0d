//! Edit sessions over a committed evaluation.

use crate::model::{parse_score_input, EvaluationResult, Metric, MetricName};
use std::str::FromStr;

/// A private working copy of an evaluation.
///
/// Edits touch only the working copy. The controller promotes it on commit,
/// drops it on discard, and resets it when a new evaluation arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    working: EvaluationResult,
    base_revision: u64,
    dirty: bool,
}

impl EditSession {
    pub(crate) fn new(snapshot: EvaluationResult, revision: u64) -> Self {
        Self {
            working: snapshot,
            base_revision: revision,
            dirty: false,
        }
    }

    pub(crate) fn reset(&mut self, snapshot: EvaluationResult, revision: u64) {
        self.working = snapshot;
        self.base_revision = revision;
        self.dirty = false;
    }

    pub(crate) fn base_revision(&self) -> u64 {
        self.base_revision
    }

    pub(crate) fn into_working(self) -> EvaluationResult {
        self.working
    }

    pub fn working(&self) -> &EvaluationResult {
        &self.working
    }

    /// True once any field has been set since the snapshot was taken.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_metric(&mut self, name: MetricName, metric: Metric) {
        *self.working.metric_mut(name) = metric;
        self.dirty = true;
    }

    pub fn set_score(&mut self, name: MetricName, score: i64) {
        self.working.metric_mut(name).score = score;
        self.dirty = true;
    }

    pub fn set_reasoning(&mut self, name: MetricName, reasoning: impl Into<String>) {
        self.working.metric_mut(name).reasoning = reasoning.into();
        self.dirty = true;
    }

    pub fn set_overall_score(&mut self, score: i64) {
        self.working.overall_score = score;
        self.dirty = true;
    }

    pub fn set_overall_comment(&mut self, comment: impl Into<String>) {
        self.working.overall_comment = comment.into();
        self.dirty = true;
    }

    pub fn apply(&mut self, edit: &FieldEdit) {
        match edit {
            FieldEdit::Score(name, score) => self.set_score(*name, *score),
            FieldEdit::Reasoning(name, text) => self.set_reasoning(*name, text.clone()),
            FieldEdit::OverallScore(score) => self.set_overall_score(*score),
            FieldEdit::OverallComment(text) => self.set_overall_comment(text.clone()),
        }
    }
}

/// A single field edit in `path=value` form, e.g. `accuracy.score=9`,
/// `coverage.reasoning=...`, `overall.score=7`, `overall.comment=...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Score(MetricName, i64),
    Reasoning(MetricName, String),
    OverallScore(i64),
    OverallComment(String),
}

impl FromStr for FieldEdit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected <field>=<value>, got '{}'", s))?;
        let (target, field) = path
            .trim()
            .split_once('.')
            .ok_or_else(|| format!("expected <metric>.<field> or overall.<field>, got '{}'", path))?;

        if target.eq_ignore_ascii_case("overall") {
            return match field {
                "score" => Ok(FieldEdit::OverallScore(parse_score_input(value))),
                "comment" => Ok(FieldEdit::OverallComment(value.to_string())),
                other => Err(format!("unknown overall field '{}' (score, comment)", other)),
            };
        }

        let name: MetricName = target.parse()?;
        match field {
            "score" => Ok(FieldEdit::Score(name, parse_score_input(value))),
            "reasoning" => Ok(FieldEdit::Reasoning(name, value.to_string())),
            other => Err(format!("unknown metric field '{}' (score, reasoning)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_edits() {
        assert_eq!(
            "accuracy.score=9".parse::<FieldEdit>().unwrap(),
            FieldEdit::Score(MetricName::Accuracy, 9)
        );
        assert_eq!(
            "Coverage.reasoning=misses the hiring thread".parse::<FieldEdit>().unwrap(),
            FieldEdit::Reasoning(MetricName::Coverage, "misses the hiring thread".into())
        );
        assert_eq!(
            "overall.score=eleven".parse::<FieldEdit>().unwrap(),
            FieldEdit::OverallScore(0)
        );
        assert_eq!(
            "overall.comment=a=b".parse::<FieldEdit>().unwrap(),
            FieldEdit::OverallComment("a=b".into())
        );
    }

    #[test]
    fn rejects_malformed_edits() {
        assert!("accuracy".parse::<FieldEdit>().is_err());
        assert!("accuracy=9".parse::<FieldEdit>().is_err());
        assert!("tone.score=9".parse::<FieldEdit>().is_err());
        assert!("accuracy.weight=9".parse::<FieldEdit>().is_err());
        assert!("overall.reasoning=x".parse::<FieldEdit>().is_err());
    }
}
