//! Finished-session views: the aggregated breakdown, raw stored details
//! and the account's session history.

use quizflow_core::{aggregate, QuizRepository};

use crate::config::Config;

use super::{print_json, repository, CliResult};

/// Display-ready breakdown of a finished session.
pub async fn results(cfg: &Config, session_id: &str) -> CliResult {
    let repo = repository(cfg)?;
    let view = aggregate(repo.as_ref(), session_id).await?;
    print_json(&view)
}

/// Raw stored summary of a past session, as the server keeps it.
pub async fn details(cfg: &Config, session_id: &str) -> CliResult {
    let repo = repository(cfg)?;
    let summary = repo.session_details(session_id).terminal().await?;
    print_json(&summary)
}

pub async fn history(cfg: &Config) -> CliResult {
    let repo = repository(cfg)?;
    let sessions = repo.history().terminal().await?;
    print_json(&sessions)
}
