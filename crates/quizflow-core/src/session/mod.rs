//! The quiz session engine: state machine, submission protocol, abandonment.

mod controller;
mod state;
mod submission;

pub use controller::{QuizController, SessionHandle};
pub use state::{Effect, QuizPhase, QuizState, UiEvent};
pub use submission::{build_submission, SubmissionGate};
