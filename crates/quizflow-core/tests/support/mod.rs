//! Shared fixtures for integration tests: a scripted repository that
//! replays queued outcomes and records every call it receives.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::NaiveDate;
use quizflow_core::envelope::EnvelopeRx;
use quizflow_core::{
    AnswerResult, AnswerSubmission, ErrorKind, QuizError, QuizInfo, QuizLeaderboard, QuizOption,
    QuizQuestion, QuizRepository, QuizSession, QuizStatistics, UserQuizSummary,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    StartQuiz,
    SubmitAnswer(AnswerSubmission),
    SessionStatus(String),
    AbandonSession(String),
    QuizResults(String),
}

/// Repository double: outcomes are queued per operation and served in
/// order; every invocation is recorded for assertions about what did (or
/// did not) go over the wire.
#[derive(Default)]
pub struct ScriptedRepository {
    calls: Mutex<Vec<Call>>,
    starts: Mutex<VecDeque<Result<QuizSession, QuizError>>>,
    statuses: Mutex<VecDeque<Result<QuizSession, QuizError>>>,
    answers: Mutex<VecDeque<Result<AnswerResult, QuizError>>>,
    summaries: Mutex<VecDeque<Result<UserQuizSummary, QuizError>>>,
}

impl ScriptedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_start(&self, outcome: Result<QuizSession, QuizError>) {
        self.starts.lock().unwrap().push_back(outcome);
    }

    pub fn push_status(&self, outcome: Result<QuizSession, QuizError>) {
        self.statuses.lock().unwrap().push_back(outcome);
    }

    pub fn push_answer(&self, outcome: Result<AnswerResult, QuizError>) {
        self.answers.lock().unwrap().push_back(outcome);
    }

    pub fn push_summary(&self, outcome: Result<UserQuizSummary, QuizError>) {
        self.summaries.lock().unwrap().push_back(outcome);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submit_calls(&self) -> Vec<AnswerSubmission> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SubmitAnswer(sub) => Some(sub),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn unscripted<T>() -> Result<T, QuizError> {
        Err(QuizError::new(ErrorKind::Unknown, "operation not scripted"))
    }
}

impl QuizRepository for ScriptedRepository {
    fn start_quiz(&self) -> EnvelopeRx<QuizSession> {
        self.record(Call::StartQuiz);
        let outcome = self
            .starts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::unscripted);
        EnvelopeRx::settled(outcome)
    }

    fn submit_answer(&self, submission: AnswerSubmission) -> EnvelopeRx<AnswerResult> {
        self.record(Call::SubmitAnswer(submission));
        let outcome = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::unscripted);
        EnvelopeRx::settled(outcome)
    }

    fn session_status(&self, session_id: &str) -> EnvelopeRx<QuizSession> {
        self.record(Call::SessionStatus(session_id.to_string()));
        let outcome = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::unscripted);
        EnvelopeRx::settled(outcome)
    }

    fn abandon_session(&self, session_id: &str) -> EnvelopeRx<()> {
        self.record(Call::AbandonSession(session_id.to_string()));
        EnvelopeRx::settled(Ok(()))
    }

    fn quiz_results(&self, session_id: &str) -> EnvelopeRx<UserQuizSummary> {
        self.record(Call::QuizResults(session_id.to_string()));
        let outcome = self
            .summaries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::unscripted);
        EnvelopeRx::settled(outcome)
    }

    fn todays_quiz(&self) -> EnvelopeRx<QuizInfo> {
        EnvelopeRx::settled(Self::unscripted())
    }

    fn quiz_info(&self, _date: NaiveDate) -> EnvelopeRx<QuizInfo> {
        EnvelopeRx::settled(Self::unscripted())
    }

    fn history(&self) -> EnvelopeRx<Vec<UserQuizSummary>> {
        EnvelopeRx::settled(Self::unscripted())
    }

    fn session_details(&self, _session_id: &str) -> EnvelopeRx<UserQuizSummary> {
        EnvelopeRx::settled(Self::unscripted())
    }

    fn todays_leaderboard(&self) -> EnvelopeRx<QuizLeaderboard> {
        EnvelopeRx::settled(Self::unscripted())
    }

    fn leaderboard(&self, _date: NaiveDate) -> EnvelopeRx<QuizLeaderboard> {
        EnvelopeRx::settled(Self::unscripted())
    }

    fn quiz_statistics(&self, _date: NaiveDate) -> EnvelopeRx<QuizStatistics> {
        EnvelopeRx::settled(Self::unscripted())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

pub fn question(number: u32) -> QuizQuestion {
    QuizQuestion {
        question_id: format!("q-{number}"),
        question_number: number,
        text: format!("Question {number}"),
        category: "General".into(),
        difficulty: "medium".into(),
        options: ["A", "B", "C", "D"]
            .iter()
            .map(|letter| QuizOption {
                letter: (*letter).to_string(),
                text: format!("Option {letter}"),
            })
            .collect(),
        source_reference: None,
    }
}

pub fn session(session_id: &str, total: u32, question_number: u32) -> QuizSession {
    QuizSession {
        session_id: session_id.into(),
        quiz_id: "quiz-2026-08-27".into(),
        title: "Daily Quiz".into(),
        total_questions: total,
        current_question: Some(question(question_number)),
    }
}

pub fn answer(correct: bool, score: u32, answered: u32, total: u32) -> AnswerResult {
    AnswerResult {
        correct,
        message: if correct { "Correct!" } else { "Not quite." }.into(),
        correct_answer: "D".into(),
        correct_option_text: "Option D".into(),
        explanation: "Because D.".into(),
        current_score: score,
        questions_answered: answered,
        total_questions: total,
        has_next_question: answered < total,
    }
}

pub fn server_error(message: &str) -> QuizError {
    QuizError::with_code(ErrorKind::ServerError, message, 500)
}
