//! Observable session state, UI events and one-shot effects.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{AnswerResult, QuizSession};

/// Where the session state machine currently is.
///
/// `Completed` and `Abandoned` are terminal; no transition leaves them.
/// There is no dead-end failure state: errors return the machine to the
/// prior interactive phase with [`QuizState::error`] attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    Idle,
    Loading,
    QuestionActive,
    AnswerSubmitting,
    ExplanationShown,
    Completed,
    Abandoned,
}

impl QuizPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuizPhase::Completed | QuizPhase::Abandoned)
    }
}

/// The closed set of events the presentation layer may send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// `Some(id)` resumes an existing session, `None` starts a fresh one.
    InitializeQuiz { session_id: Option<String> },
    /// Record the answer candidate locally; no network call.
    SelectAnswer(String),
    SubmitAnswer,
    NextQuestion,
    RequestAbandon,
    ConfirmAbandon,
    CancelAbandon,
    ClearError,
    /// Replay the last failed retryable operation with identical arguments.
    Retry,
}

/// One-shot messages to the presentation layer.
///
/// Delivered over a bounded queue with exactly one consumer; never
/// re-delivered on state re-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    NavigateToResults { session_id: String },
    NavigateBack,
    ShowAbandonConfirmation,
    /// Carries a message; the failed operation is replayable via
    /// [`UiEvent::Retry`].
    ShowRetryableError { message: String },
}

/// Snapshot of the session published after every mutation.
///
/// Single-writer: only the controller produces these; any number of
/// read-only observers consume them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizState {
    pub phase: QuizPhase,
    /// Spinner toggle mirroring the current operation's Loading envelopes.
    pub loading: bool,
    pub session: Option<QuizSession>,
    /// The locally recorded answer candidate for the active question.
    pub selected_option: Option<String>,
    pub last_result: Option<AnswerResult>,
    /// Last server-confirmed score; never computed locally.
    pub score: u32,
    pub elapsed_seconds: u64,
    pub error: Option<QuizError>,
    /// Abandon confirmation is pending; the phase itself is untouched.
    pub abandon_prompt: bool,
}

impl Default for QuizState {
    fn default() -> Self {
        Self {
            phase: QuizPhase::Idle,
            loading: false,
            session: None,
            selected_option: None,
            last_result: None,
            score: 0,
            elapsed_seconds: 0,
            error: None,
            abandon_prompt: false,
        }
    }
}

impl QuizState {
    /// Number of the question currently shown, if any.
    pub fn question_number(&self) -> Option<u32> {
        self.session
            .as_ref()
            .and_then(|s| s.current_question.as_ref())
            .map(|q| q.question_number)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id.as_str())
    }
}
