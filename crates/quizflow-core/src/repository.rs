//! The network boundary of the session engine.

use chrono::NaiveDate;

use crate::envelope::EnvelopeRx;
use crate::model::{
    AnswerResult, AnswerSubmission, QuizInfo, QuizLeaderboard, QuizSession, QuizStatistics,
    UserQuizSummary,
};

/// Everything the engine asks of the quiz service.
///
/// Constructor-injected once at the composition root
/// (`Arc<dyn QuizRepository>`); the controller never knows the transport.
/// Each method returns the full envelope sequence for one call. Failures
/// are always delivered as `Error` envelopes, never as panics.
pub trait QuizRepository: Send + Sync {
    /// Create a session for today's quiz and return it with its first
    /// question.
    fn start_quiz(&self) -> EnvelopeRx<QuizSession>;

    /// Submit one answer. The server advances the session and reports the
    /// confirmed score.
    fn submit_answer(&self, submission: AnswerSubmission) -> EnvelopeRx<AnswerResult>;

    /// Current server-side view of a session, including the question now
    /// active.
    fn session_status(&self, session_id: &str) -> EnvelopeRx<QuizSession>;

    /// Mark a session abandoned. Callers treat this as fire-and-forget.
    fn abandon_session(&self, session_id: &str) -> EnvelopeRx<()>;

    /// Terminal summary for a completed session.
    fn quiz_results(&self, session_id: &str) -> EnvelopeRx<UserQuizSummary>;

    fn todays_quiz(&self) -> EnvelopeRx<QuizInfo>;

    fn quiz_info(&self, date: NaiveDate) -> EnvelopeRx<QuizInfo>;

    /// Metadata of the caller's past quiz sessions.
    fn history(&self) -> EnvelopeRx<Vec<UserQuizSummary>>;

    /// Full details of one past session.
    fn session_details(&self, session_id: &str) -> EnvelopeRx<UserQuizSummary>;

    fn todays_leaderboard(&self) -> EnvelopeRx<QuizLeaderboard>;

    fn leaderboard(&self, date: NaiveDate) -> EnvelopeRx<QuizLeaderboard>;

    fn quiz_statistics(&self, date: NaiveDate) -> EnvelopeRx<QuizStatistics>;
}
