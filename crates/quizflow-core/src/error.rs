//! Error taxonomy for quizflow-core.
//!
//! Every failure that reaches a consumer is a [`QuizError`]: a classified
//! kind, a human-readable message and an optional transport status code.
//! The taxonomy is closed; transport errors are folded into it at the
//! repository boundary and never escape as raw `reqwest` errors.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed classification of operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connectivity,
    Timeout,
    Authentication,
    Authorization,
    NotFound,
    ServerError,
    Validation,
    Unknown,
}

impl ErrorKind {
    /// Whether an operation failing with this kind may be replayed as-is.
    ///
    /// Authentication, authorization and validation failures need an
    /// external collaborator (re-login, fixed input) before a retry can
    /// succeed, so they are not retryable here.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Connectivity | ErrorKind::Timeout | ErrorKind::ServerError
        )
    }
}

/// The error carried by every terminal `Error` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct QuizError {
    pub kind: ErrorKind,
    pub message: String,
    /// Transport status code, when the failure came from an HTTP response.
    pub code: Option<u16>,
}

impl QuizError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(kind: ErrorKind, message: impl Into<String>, code: u16) -> Self {
        Self {
            kind,
            message: message.into(),
            code: Some(code),
        }
    }

    /// The defect case: an operation's scope ended without a terminal value.
    pub fn missing_terminal() -> Self {
        Self::new(ErrorKind::Unknown, "operation ended without a result")
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Map an HTTP status onto the taxonomy.
pub fn classify_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED => ErrorKind::Authentication,
        StatusCode::FORBIDDEN => ErrorKind::Authorization,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::REQUEST_TIMEOUT => ErrorKind::Timeout,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
        s if s.is_server_error() => ErrorKind::ServerError,
        _ => ErrorKind::Unknown,
    }
}

impl From<reqwest::Error> for QuizError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connectivity
        } else if let Some(status) = err.status() {
            classify_status(status)
        } else {
            ErrorKind::Unknown
        };
        Self {
            kind,
            message: err.to_string(),
            code: err.status().map(|s| s.as_u16()),
        }
    }
}
