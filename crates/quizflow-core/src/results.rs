//! Results aggregation: terminal session summary to display-ready breakdown.
//!
//! Pure consumer of a terminal session id. Performs one fetch and maps the
//! raw records; score and percentages stay server-authoritative and are
//! never recomputed here.

use serde::Serialize;

use crate::error::QuizError;
use crate::model::{CategoryStats, QuestionResult, UserQuizSummary};
use crate::repository::QuizRepository;

/// One category row of the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub stats: CategoryStats,
}

/// Display-ready view of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsBreakdown {
    pub session_id: String,
    pub score: u32,
    pub performance_level: String,
    pub duration_seconds: u64,
    /// Same order the questions were asked in.
    pub questions: Vec<QuestionResult>,
    /// Sorted by category name for stable display. Empty when the server
    /// reported no category data.
    pub categories: Vec<CategoryBreakdown>,
}

/// Map a summary into the breakdown. Pure; tolerates an empty category map.
pub fn breakdown(summary: UserQuizSummary) -> ResultsBreakdown {
    let categories = summary
        .category_performance
        .into_iter()
        .map(|(category, stats)| CategoryBreakdown { category, stats })
        .collect();
    ResultsBreakdown {
        session_id: summary.session_id,
        score: summary.score,
        performance_level: summary.performance_level,
        duration_seconds: summary.duration_seconds,
        questions: summary.question_results,
        categories,
    }
}

/// Fetch a terminal session's summary and map it.
pub async fn aggregate(
    repo: &dyn QuizRepository,
    session_id: &str,
) -> Result<ResultsBreakdown, QuizError> {
    let summary = repo.quiz_results(session_id).terminal().await?;
    Ok(breakdown(summary))
}
