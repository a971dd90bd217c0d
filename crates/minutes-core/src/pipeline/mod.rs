//! Phase machine owning the authoritative pipeline state.
//!
//! Each remote call is a `start_*` / `complete_*` pair. `start_*` checks the
//! guard, moves the phase and hands out a ticket holding the input snapshot;
//! `complete_*` consumes that ticket with the call's outcome and always lands
//! back in `Idle`. Only one ticket can be outstanding.

mod session;

use crate::errors::{GuardReason, PipelineError};
use crate::judge::Judge;
use crate::model::EvaluationResult;
use crate::summary::SummaryGenerator;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use session::{EditSession, FieldEdit};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    GeneratingSummary,
    Evaluating,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::GeneratingSummary => "generating summary",
            Phase::Evaluating => "evaluating",
        })
    }
}

/// Proof that a generation call was started; consumed on completion.
#[must_use = "a started generation must be completed"]
#[derive(Debug)]
pub struct GenerationTicket {
    call_id: u64,
    transcript: String,
}

impl GenerationTicket {
    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

/// Proof that an evaluation call was started; consumed on completion.
#[must_use = "a started evaluation must be completed"]
#[derive(Debug)]
pub struct EvaluationTicket {
    call_id: u64,
    transcript: String,
    summary: String,
}

impl EvaluationTicket {
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

#[derive(Debug, Default)]
pub struct PipelineController {
    transcript: String,
    summary: String,
    phase: Phase,
    evaluation: Option<EvaluationResult>,
    /// Bumped whenever `evaluation` is replaced or cleared.
    revision: u64,
    last_error: Option<PipelineError>,
    session: Option<EditSession>,
    in_flight: Option<u64>,
}

impl PipelineController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcript(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn evaluation(&self) -> Option<&EvaluationResult> {
        self.evaluation.as_ref()
    }

    pub fn last_error(&self) -> Option<&PipelineError> {
        self.last_error.as_ref()
    }

    pub fn can_start_generation(&self) -> bool {
        self.phase == Phase::Idle && !is_blank(&self.transcript)
    }

    pub fn can_start_evaluation(&self) -> bool {
        self.phase == Phase::Idle && !is_blank(&self.transcript) && !is_blank(&self.summary)
    }

    /// Replace the transcript. Rejected while a call holding a transcript
    /// snapshot is in flight.
    pub fn set_transcript(&mut self, transcript: impl Into<String>) -> Result<(), PipelineError> {
        self.ensure_idle()?;
        self.transcript = transcript.into();
        Ok(())
    }

    /// Replace the summary. The current evaluation is kept as is, even
    /// though it may now describe older text; it persists until the next
    /// evaluation overwrites it.
    pub fn set_summary(&mut self, summary: impl Into<String>) -> Result<(), PipelineError> {
        self.ensure_idle()?;
        self.summary = summary.into();
        Ok(())
    }

    pub fn start_generation(&mut self) -> Result<GenerationTicket, PipelineError> {
        self.ensure_idle()?;
        if is_blank(&self.transcript) {
            return Err(reject(GuardReason::BlankTranscript));
        }

        self.phase = Phase::GeneratingSummary;
        self.last_error = None;
        // A new summary invalidates the old verdict and any edits of it.
        self.evaluation = None;
        self.session = None;
        self.revision += 1;

        let call_id = self.begin_call();
        tracing::info!(
            call_id,
            transcript_chars = self.transcript.chars().count(),
            "summary generation started"
        );
        Ok(GenerationTicket {
            call_id,
            transcript: self.transcript.clone(),
        })
    }

    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        outcome: Result<String, PipelineError>,
    ) -> Result<(), PipelineError> {
        self.finish_call(ticket.call_id, Phase::GeneratingSummary)?;

        let outcome = match outcome {
            Ok(text) if is_blank(&text) => {
                Err(PipelineError::generation("model returned no text"))
            }
            Ok(text) => Ok(text),
            Err(e @ PipelineError::GenerationFailure { .. }) => Err(e),
            Err(other) => Err(PipelineError::generation(other.to_string())),
        };

        match outcome {
            Ok(summary) => {
                tracing::info!(call_id = ticket.call_id, "summary stored");
                self.summary = summary;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(call_id = ticket.call_id, error = %e, "summary generation failed");
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn start_evaluation(&mut self) -> Result<EvaluationTicket, PipelineError> {
        self.ensure_idle()?;
        if is_blank(&self.transcript) {
            return Err(reject(GuardReason::BlankTranscript));
        }
        if is_blank(&self.summary) {
            return Err(reject(GuardReason::BlankSummary));
        }

        self.phase = Phase::Evaluating;
        self.last_error = None;

        let call_id = self.begin_call();
        tracing::info!(
            call_id,
            summary_chars = self.summary.chars().count(),
            "evaluation started"
        );
        Ok(EvaluationTicket {
            call_id,
            transcript: self.transcript.clone(),
            summary: self.summary.clone(),
        })
    }

    pub fn complete_evaluation(
        &mut self,
        ticket: EvaluationTicket,
        outcome: Result<EvaluationResult, PipelineError>,
    ) -> Result<(), PipelineError> {
        self.finish_call(ticket.call_id, Phase::Evaluating)?;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    call_id = ticket.call_id,
                    overall_score = result.overall_score,
                    "evaluation stored"
                );
                self.replace_evaluation(result);
                Ok(())
            }
            Err(e) => {
                let e = match e {
                    e @ PipelineError::EvaluationFailure { .. } => e,
                    other => PipelineError::evaluation(other.to_string()),
                };
                tracing::warn!(call_id = ticket.call_id, error = %e, "evaluation failed");
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Start, call the generator, complete.
    ///
    /// If the returned future is dropped before the call finishes (an
    /// external timeout, say), the controller still lands in `Idle` with a
    /// recorded `GenerationFailure` and the previous summary.
    pub async fn run_generation(
        &mut self,
        generator: &SummaryGenerator,
    ) -> Result<(), PipelineError> {
        let ticket = self.start_generation()?;
        let mut guard = AbandonOnDrop::new(self, ticket.call_id);
        let outcome = generator.generate(ticket.transcript()).await;
        guard.settle().complete_generation(ticket, outcome)
    }

    /// Start, call the judge, complete. Dropping the future mid-call
    /// returns the controller to `Idle` with the prior evaluation intact.
    pub async fn run_evaluation(&mut self, judge: &Judge) -> Result<(), PipelineError> {
        let ticket = self.start_evaluation()?;
        let mut guard = AbandonOnDrop::new(self, ticket.call_id);
        let outcome = judge.evaluate(ticket.transcript(), ticket.summary()).await;
        guard.settle().complete_evaluation(ticket, outcome)
    }

    /// Give up on the call in flight, for callers of `start_*` whose ticket
    /// was lost. The remote call is not cancelled; its result can no longer
    /// land. Records the stage failure and returns it, or `None` when idle.
    pub fn abandon_in_flight(&mut self) -> Option<PipelineError> {
        let call_id = self.in_flight?;
        self.abandon_call(call_id)
    }

    /// Open an edit session on the current evaluation. An already open
    /// session is returned unchanged.
    pub fn begin_edit(&mut self) -> Result<&mut EditSession, PipelineError> {
        let Some(current) = self.evaluation.as_ref() else {
            return Err(reject(GuardReason::NoEvaluation));
        };
        let revision = self.revision;
        Ok(self
            .session
            .get_or_insert_with(|| EditSession::new(current.clone(), revision)))
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// Promote the working copy to the authoritative evaluation.
    pub fn commit_edit(&mut self) -> Result<&EvaluationResult, PipelineError> {
        let Some(session) = self.session.take() else {
            return Err(reject(GuardReason::NoEditSession));
        };
        if session.base_revision() != self.revision || self.evaluation.is_none() {
            return Err(reject(GuardReason::StaleTicket));
        }
        let dirty = session.is_dirty();
        self.revision += 1;
        let committed = self.evaluation.insert(session.into_working());
        tracing::info!(dirty, "evaluation edits committed");
        Ok(&*committed)
    }

    /// Drop the working copy. Returns whether a session was open.
    pub fn discard_edit(&mut self) -> bool {
        let had = self.session.take().is_some();
        if had {
            tracing::debug!("evaluation edits discarded");
        }
        had
    }

    fn replace_evaluation(&mut self, result: EvaluationResult) {
        self.revision += 1;
        if let Some(session) = self.session.as_mut() {
            if session.is_dirty() {
                tracing::info!("new evaluation arrived, unsaved edits were reset");
            }
            session.reset(result.clone(), self.revision);
        }
        self.evaluation = Some(result);
    }

    fn ensure_idle(&self) -> Result<(), PipelineError> {
        if self.phase != Phase::Idle {
            return Err(reject(GuardReason::Busy(self.phase)));
        }
        Ok(())
    }

    fn begin_call(&mut self) -> u64 {
        // Process-wide ids, so a ticket from another controller never matches.
        static NEXT_CALL_ID: AtomicU64 = AtomicU64::new(1);
        let call_id = NEXT_CALL_ID.fetch_add(1, Ordering::Relaxed);
        self.in_flight = Some(call_id);
        call_id
    }

    fn abandon_call(&mut self, call_id: u64) -> Option<PipelineError> {
        if self.in_flight != Some(call_id) {
            return None;
        }
        let err = match self.phase {
            Phase::GeneratingSummary => {
                PipelineError::generation("call abandoned before it completed")
            }
            Phase::Evaluating => PipelineError::evaluation("call abandoned before it completed"),
            Phase::Idle => return None,
        };
        tracing::warn!(call_id, phase = %self.phase, "in-flight call abandoned");
        self.in_flight = None;
        self.phase = Phase::Idle;
        self.last_error = Some(err.clone());
        Some(err)
    }

    fn finish_call(&mut self, call_id: u64, expected: Phase) -> Result<(), PipelineError> {
        if self.in_flight != Some(call_id) || self.phase != expected {
            return Err(reject(GuardReason::StaleTicket));
        }
        self.in_flight = None;
        self.phase = Phase::Idle;
        Ok(())
    }
}

/// Abandons the call in flight unless settled first, so a dropped `run_*`
/// future cannot leave the phase busy.
struct AbandonOnDrop<'a> {
    controller: &'a mut PipelineController,
    call_id: u64,
    armed: bool,
}

impl<'a> AbandonOnDrop<'a> {
    fn new(controller: &'a mut PipelineController, call_id: u64) -> Self {
        Self {
            controller,
            call_id,
            armed: true,
        }
    }

    fn settle(&mut self) -> &mut PipelineController {
        self.armed = false;
        &mut *self.controller
    }
}

impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.controller.abandon_call(self.call_id);
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn reject(reason: GuardReason) -> PipelineError {
    tracing::debug!(%reason, "transition rejected");
    PipelineError::GuardRejected(reason)
}
