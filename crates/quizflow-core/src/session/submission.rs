//! Answer submission protocol: validation and the single-flight gate.

use crate::error::{ErrorKind, QuizError};
use crate::model::{AnswerSubmission, QuizSession};

/// Enforces at most one outstanding submission per session.
///
/// A second submit attempt while one is in flight is rejected locally --
/// no network call is made, nothing is queued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionGate {
    in_flight: bool,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate. Returns false if a submission is already outstanding.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Release the gate once the submission reached a terminal envelope.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

/// Validate the candidate answer and build the immutable submission payload.
///
/// Preconditions from the protocol contract: the session must have an
/// active question, the candidate must be non-empty, and it must match one
/// of the question's option letters. Violations are `Validation` errors
/// raised before any network traffic.
pub fn build_submission(
    session: &QuizSession,
    selected: Option<&str>,
) -> Result<AnswerSubmission, QuizError> {
    let question = session.current_question.as_ref().ok_or_else(|| {
        QuizError::new(ErrorKind::Validation, "session has no active question")
    })?;

    let letter = match selected {
        Some(l) if !l.is_empty() => l,
        _ => {
            return Err(QuizError::new(
                ErrorKind::Validation,
                "no answer selected",
            ))
        }
    };

    if !question.has_option(letter) {
        return Err(QuizError::new(
            ErrorKind::Validation,
            format!("'{letter}' is not an option for this question"),
        ));
    }

    Ok(AnswerSubmission {
        session_id: session.session_id.clone(),
        question_number: question.question_number,
        selected_option: letter.to_string(),
    })
}
