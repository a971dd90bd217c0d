//! Error types for the pipeline and its configuration.

use crate::pipeline::Phase;
use std::path::PathBuf;

/// Failures of a pipeline stage and rejected transitions.
///
/// Stage failures never leave partial state behind: the controller is back in
/// `Idle` and nothing half-built is exposed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// The summary generator failed or produced no usable text.
    #[error("summary generation failed: {message}")]
    GenerationFailure { message: String },

    /// The judge call failed or its payload did not validate.
    #[error("evaluation failed: {message}")]
    EvaluationFailure { message: String },

    /// A transition precondition did not hold; nothing changed.
    #[error("transition rejected: {0}")]
    GuardRejected(GuardReason),
}

impl PipelineError {
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationFailure {
            message: message.into(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::EvaluationFailure {
            message: message.into(),
        }
    }

    pub fn is_guard_rejected(&self) -> bool {
        matches!(self, Self::GuardRejected(_))
    }

    /// Generic per-stage notice for end users; details stay in logs.
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::GenerationFailure { .. } => "Failed to generate summary. Please try again.",
            Self::EvaluationFailure { .. } => "Failed to evaluate the summary. Please try again.",
            Self::GuardRejected(_) => "This action is not available right now.",
        }
    }
}

/// Why a transition was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardReason {
    #[error("transcript is blank")]
    BlankTranscript,

    #[error("summary is blank")]
    BlankSummary,

    #[error("pipeline is busy ({0})")]
    Busy(Phase),

    #[error("no evaluation to edit")]
    NoEvaluation,

    #[error("no edit session is active")]
    NoEditSession,

    #[error("completion does not belong to the call in flight")]
    StaleTicket,
}

impl From<GuardReason> for PipelineError {
    fn from(reason: GuardReason) -> Self {
        PipelineError::GuardRejected(reason)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("missing API key: environment variable {var} is not set")]
    MissingApiKey { var: String },

    #[error("failed to build provider client: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = PipelineError::evaluation("missing field `coverage`");
        assert_eq!(err.to_string(), "evaluation failed: missing field `coverage`");
        let err: PipelineError = GuardReason::Busy(Phase::Evaluating).into();
        assert_eq!(err.to_string(), "transition rejected: pipeline is busy (evaluating)");
        assert!(err.is_guard_rejected());
    }
}
