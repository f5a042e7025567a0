//! ApiQuizRepository: HTTP implementation of the repository boundary.

use chrono::NaiveDate;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::envelope::{spawn_envelope, EnvelopeRx};
use crate::error::{classify_status, ErrorKind, QuizError};
use crate::model::{
    AnswerResult, AnswerSubmission, QuizInfo, QuizLeaderboard, QuizSession, QuizStatistics,
    UserQuizSummary,
};
use crate::repository::QuizRepository;

/// JSON client for the quiz service.
///
/// Every call is observed as an envelope sequence; transport failures and
/// non-success statuses are folded into the closed error taxonomy. Requests
/// carry a fresh `x-request-id` for server-side diagnostics.
pub struct ApiQuizRepository {
    base_url: Url,
    bearer_token: Option<String>,
    client: Client,
}

impl ApiQuizRepository {
    pub fn new(base_url: Url, bearer_token: Option<String>) -> Self {
        Self {
            base_url,
            bearer_token,
            client: Client::new(),
        }
    }

    fn call<T>(&self, method: Method, path: String, body: Option<serde_json::Value>) -> EnvelopeRx<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.client.clone();
        let token = self.bearer_token.clone();
        let url = self.base_url.join(&path);
        spawn_envelope(async move {
            let url = url
                .map_err(|e| QuizError::new(ErrorKind::Unknown, format!("bad request url: {e}")))?;
            let resp = send(client, method, url, token, body).await?;
            resp.json::<T>().await.map_err(|e| {
                QuizError::new(ErrorKind::Unknown, format!("malformed response: {e}"))
            })
        })
    }

    /// Like [`Self::call`] but discards the response body.
    fn call_unit(&self, method: Method, path: String) -> EnvelopeRx<()> {
        let client = self.client.clone();
        let token = self.bearer_token.clone();
        let url = self.base_url.join(&path);
        spawn_envelope(async move {
            let url = url
                .map_err(|e| QuizError::new(ErrorKind::Unknown, format!("bad request url: {e}")))?;
            send(client, method, url, token, None).await.map(|_| ())
        })
    }
}

async fn send(
    client: Client,
    method: Method,
    url: Url,
    token: Option<String>,
    body: Option<serde_json::Value>,
) -> Result<reqwest::Response, QuizError> {
    let mut req = client
        .request(method, url)
        .header("x-request-id", Uuid::new_v4().to_string());
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    if let Some(body) = body {
        req = req.json(&body);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    Err(QuizError::with_code(
        classify_status(status),
        error_message(status, &text),
        status.as_u16(),
    ))
}

/// Best-effort human-readable message from an error response body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

impl QuizRepository for ApiQuizRepository {
    fn start_quiz(&self) -> EnvelopeRx<QuizSession> {
        self.call(Method::POST, "api/v1/quiz/sessions".into(), None)
    }

    fn submit_answer(&self, submission: AnswerSubmission) -> EnvelopeRx<AnswerResult> {
        let path = format!("api/v1/quiz/sessions/{}/answers", submission.session_id);
        let body = serde_json::json!({
            "question_number": submission.question_number,
            "selected_option": submission.selected_option,
        });
        self.call(Method::POST, path, Some(body))
    }

    fn session_status(&self, session_id: &str) -> EnvelopeRx<QuizSession> {
        self.call(
            Method::GET,
            format!("api/v1/quiz/sessions/{session_id}"),
            None,
        )
    }

    fn abandon_session(&self, session_id: &str) -> EnvelopeRx<()> {
        self.call_unit(
            Method::POST,
            format!("api/v1/quiz/sessions/{session_id}/abandon"),
        )
    }

    fn quiz_results(&self, session_id: &str) -> EnvelopeRx<UserQuizSummary> {
        self.call(
            Method::GET,
            format!("api/v1/quiz/sessions/{session_id}/results"),
            None,
        )
    }

    fn todays_quiz(&self) -> EnvelopeRx<QuizInfo> {
        self.call(Method::GET, "api/v1/quiz/today".into(), None)
    }

    fn quiz_info(&self, date: NaiveDate) -> EnvelopeRx<QuizInfo> {
        self.call(Method::GET, format!("api/v1/quiz/info/{date}"), None)
    }

    fn history(&self) -> EnvelopeRx<Vec<UserQuizSummary>> {
        self.call(Method::GET, "api/v1/quiz/history".into(), None)
    }

    fn session_details(&self, session_id: &str) -> EnvelopeRx<UserQuizSummary> {
        self.call(
            Method::GET,
            format!("api/v1/quiz/sessions/{session_id}/details"),
            None,
        )
    }

    fn todays_leaderboard(&self) -> EnvelopeRx<QuizLeaderboard> {
        self.call(Method::GET, "api/v1/quiz/leaderboard/today".into(), None)
    }

    fn leaderboard(&self, date: NaiveDate) -> EnvelopeRx<QuizLeaderboard> {
        self.call(Method::GET, format!("api/v1/quiz/leaderboard/{date}"), None)
    }

    fn quiz_statistics(&self, date: NaiveDate) -> EnvelopeRx<QuizStatistics> {
        self.call(Method::GET, format!("api/v1/quiz/statistics/{date}"), None)
    }
}
