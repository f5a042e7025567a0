pub mod config;
pub mod play;
pub mod quiz;
pub mod results;

use std::sync::Arc;

use chrono::NaiveDate;
use quizflow_core::ApiQuizRepository;
use serde::Serialize;
use url::Url;

use crate::config::Config;

pub(crate) type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Repository wired from the configured endpoint and credentials.
pub(crate) fn repository(cfg: &Config) -> Result<Arc<ApiQuizRepository>, Box<dyn std::error::Error>> {
    let base = Url::parse(&cfg.api.base_url)
        .map_err(|e| format!("invalid api.base_url '{}': {e}", cfg.api.base_url))?;
    Ok(Arc::new(ApiQuizRepository::new(base, cfg.api.token.clone())))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{s}', expected YYYY-MM-DD").into())
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> CliResult {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
