//! # Quizflow Core Library
//!
//! This library provides the core business logic for the Quizflow daily quiz.
//! It implements a CLI-first philosophy where the full session flow is
//! available through this library, with any front end being a thin layer
//! over the same controller.
//!
//! ## Architecture
//!
//! - **Result Envelope**: every repository operation yields a stream of
//!   loading/success/error envelopes with a closed error taxonomy
//! - **Timer Service**: a cancellable periodic ticker driving the per-question
//!   elapsed clock and rate-limit cooldowns
//! - **Session Controller**: the state machine from quiz start through answer
//!   submission, explanation, abandonment and completion
//! - **Results Aggregator**: maps a terminal session's summary into a
//!   display-ready breakdown
//!
//! ## Key Components
//!
//! - [`QuizController`]: core session state machine
//! - [`ResultEnvelope`]: async operation outcome wrapper
//! - [`QuizRepository`]: injected network boundary
//! - [`ApiQuizRepository`]: HTTP implementation of the repository

pub mod api;
pub mod envelope;
pub mod error;
pub mod model;
pub mod repository;
pub mod results;
pub mod session;
pub mod timer;

pub use api::ApiQuizRepository;
pub use envelope::{EnvelopeRx, ResultEnvelope};
pub use error::{ErrorKind, QuizError};
pub use model::{
    AnswerResult, AnswerSubmission, CategoryStats, LeaderboardEntry, QuestionResult, QuizInfo,
    QuizLeaderboard, QuizOption, QuizQuestion, QuizSession, QuizStatistics, UserQuizSummary,
};
pub use repository::QuizRepository;
pub use results::{aggregate, CategoryBreakdown, ResultsBreakdown};
pub use session::{Effect, QuizController, QuizPhase, QuizState, SessionHandle, UiEvent};
pub use timer::{Cooldown, ElapsedClock, Ticker};
