//! Wire/data model for the quiz domain.
//!
//! All types mirror the JSON exchanged with the quiz service and carry no
//! behavior beyond small lookups. Scores and percentages are
//! server-authoritative; nothing here recomputes them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    /// Unique letter code within the question ("A".."F").
    pub letter: String,
    pub text: String,
}

/// The question currently presented by a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question_id: String,
    /// 1-indexed, never exceeds the session's `total_questions`.
    pub question_number: u32,
    pub text: String,
    pub category: String,
    pub difficulty: String,
    /// Ordered, 2-6 entries.
    pub options: Vec<QuizOption>,
    #[serde(default)]
    pub source_reference: Option<String>,
}

impl QuizQuestion {
    /// Whether `letter` names one of this question's options.
    pub fn has_option(&self, letter: &str) -> bool {
        self.options.iter().any(|o| o.letter == letter)
    }
}

/// A live quiz session as reported by the server.
///
/// `session_id` is opaque and stable for the session lifetime;
/// `current_question` is replaced in place as the session advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    pub session_id: String,
    pub quiz_id: String,
    pub title: String,
    pub total_questions: u32,
    #[serde(default)]
    pub current_question: Option<QuizQuestion>,
}

/// One answer on its way to the server. Immutable, single-use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub session_id: String,
    pub question_number: u32,
    pub selected_option: String,
}

/// Server verdict for one submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub correct: bool,
    pub message: String,
    pub correct_answer: String,
    pub correct_option_text: String,
    pub explanation: String,
    /// Monotonically non-decreasing across a session.
    pub current_score: u32,
    pub questions_answered: u32,
    pub total_questions: u32,
    pub has_next_question: bool,
}

/// Per-question record inside a terminal session summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_number: u32,
    pub question_text: String,
    pub category: String,
    pub selected_option: String,
    pub correct_option: String,
    pub correct: bool,
}

/// Per-category aggregate inside a terminal session summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percentage: f64,
    pub feedback: String,
}

/// Terminal artifact of a session, fetched once it completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserQuizSummary {
    pub session_id: String,
    /// 0-100, server-computed.
    pub score: u32,
    pub performance_level: String,
    pub duration_seconds: u64,
    /// Preserves the order questions were asked in.
    pub question_results: Vec<QuestionResult>,
    #[serde(default)]
    pub category_performance: BTreeMap<String, CategoryStats>,
}

/// Metadata about a day's quiz, independent of any session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizInfo {
    pub quiz_id: String,
    pub date: NaiveDate,
    pub title: String,
    pub total_questions: u32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub display_name: String,
    pub score: u32,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizLeaderboard {
    pub date: NaiveDate,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizStatistics {
    pub date: NaiveDate,
    pub participants: u32,
    pub average_score: f64,
    pub completion_rate: f64,
}
