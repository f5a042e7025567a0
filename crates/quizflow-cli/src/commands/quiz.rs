//! Read-only quiz lookups: today's quiz, per-date info, leaderboards and
//! participation statistics. Each prints the server's answer as JSON.

use quizflow_core::QuizRepository;

use crate::config::Config;

use super::{parse_date, print_json, repository, CliResult};

pub async fn today(cfg: &Config) -> CliResult {
    let repo = repository(cfg)?;
    let info = repo.todays_quiz().terminal().await?;
    print_json(&info)
}

pub async fn info(cfg: &Config, date: &str) -> CliResult {
    let repo = repository(cfg)?;
    let info = repo.quiz_info(parse_date(date)?).terminal().await?;
    print_json(&info)
}

/// Leaderboard for a date, or today's when no date is given.
pub async fn leaderboard(cfg: &Config, date: Option<&str>) -> CliResult {
    let repo = repository(cfg)?;
    let board = match date {
        Some(date) => repo.leaderboard(parse_date(date)?).terminal().await?,
        None => repo.todays_leaderboard().terminal().await?,
    };
    print_json(&board)
}

pub async fn stats(cfg: &Config, date: &str) -> CliResult {
    let repo = repository(cfg)?;
    let stats = repo.quiz_statistics(parse_date(date)?).terminal().await?;
    print_json(&stats)
}
