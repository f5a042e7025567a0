//! End-to-end controller behavior against a scripted repository.

mod support;

use std::sync::Arc;
use std::time::Duration;

use quizflow_core::{
    Effect, ErrorKind, QuizController, QuizError, QuizPhase, SessionHandle, UiEvent,
};
use support::{answer, server_error, session, Call, ScriptedRepository};
use tokio::sync::mpsc::Receiver;

fn new_controller(
    repo: Arc<ScriptedRepository>,
) -> (QuizController, Receiver<Effect>) {
    let (controller, _state_rx, effects_rx) = QuizController::new(repo);
    (controller, effects_rx)
}

async fn start_active(
    repo: &Arc<ScriptedRepository>,
    controller: &mut QuizController,
    total: u32,
) {
    repo.push_start(Ok(session("abc123", total, 1)));
    controller.handle(UiEvent::InitializeQuiz { session_id: None });
    controller.settle().await;
    assert_eq!(controller.phase(), QuizPhase::QuestionActive);
}

#[tokio::test]
async fn scenario_a_start_answer_advance() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, _effects) = new_controller(repo.clone());

    repo.push_start(Ok(session("abc123", 10, 1)));
    controller.handle(UiEvent::InitializeQuiz { session_id: None });
    assert_eq!(controller.phase(), QuizPhase::Loading);
    controller.settle().await;

    assert_eq!(controller.phase(), QuizPhase::QuestionActive);
    assert_eq!(controller.state().session_id(), Some("abc123"));
    assert_eq!(controller.state().question_number(), Some(1));

    // Some thinking time accumulates on the elapsed clock.
    controller.tick();
    controller.tick();
    assert_eq!(controller.state().elapsed_seconds, 2);

    controller.handle(UiEvent::SelectAnswer("D".into()));
    assert_eq!(controller.state().selected_option.as_deref(), Some("D"));

    repo.push_answer(Ok(answer(true, 10, 1, 10)));
    controller.handle(UiEvent::SubmitAnswer);
    assert_eq!(controller.phase(), QuizPhase::AnswerSubmitting);
    controller.settle().await;

    assert_eq!(controller.phase(), QuizPhase::ExplanationShown);
    assert_eq!(controller.state().score, 10);
    let result = controller.state().last_result.clone().unwrap();
    assert!(result.correct);
    assert_eq!(result.correct_answer, "D");

    repo.push_status(Ok(session("abc123", 10, 2)));
    controller.handle(UiEvent::NextQuestion);
    controller.settle().await;

    assert_eq!(controller.phase(), QuizPhase::QuestionActive);
    assert_eq!(controller.state().question_number(), Some(2));
    assert_eq!(controller.state().elapsed_seconds, 0);
    assert!(controller.state().selected_option.is_none());
}

#[tokio::test]
async fn scenario_c_duplicate_submit_rejected_locally() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, _effects) = new_controller(repo.clone());
    start_active(&repo, &mut controller, 10).await;

    controller.handle(UiEvent::SelectAnswer("A".into()));
    repo.push_answer(Ok(answer(false, 0, 1, 10)));
    controller.handle(UiEvent::SubmitAnswer);
    assert_eq!(controller.phase(), QuizPhase::AnswerSubmitting);

    // Second submit while the first is still in flight: no second call.
    controller.handle(UiEvent::SubmitAnswer);
    assert_eq!(controller.phase(), QuizPhase::AnswerSubmitting);
    assert_eq!(repo.submit_calls().len(), 1);

    controller.settle().await;
    assert_eq!(controller.phase(), QuizPhase::ExplanationShown);
}

#[tokio::test]
async fn submit_failure_rolls_back_to_same_question() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, mut effects) = new_controller(repo.clone());
    start_active(&repo, &mut controller, 10).await;

    controller.handle(UiEvent::SelectAnswer("B".into()));
    repo.push_answer(Err(server_error("quiz service unavailable")));
    controller.handle(UiEvent::SubmitAnswer);
    controller.settle().await;

    // Same phase, same question, same candidate still selectable.
    assert_eq!(controller.phase(), QuizPhase::QuestionActive);
    assert_eq!(controller.state().question_number(), Some(1));
    assert_eq!(controller.state().selected_option.as_deref(), Some("B"));
    assert_eq!(controller.state().score, 0);

    let err = controller.state().error.clone().unwrap();
    assert_eq!(err.kind, ErrorKind::ServerError);

    // Drain the one-shot retryable-error effect.
    let mut saw_retryable = false;
    while let Ok(effect) = effects.try_recv() {
        if matches!(effect, Effect::ShowRetryableError { .. }) {
            saw_retryable = true;
        }
    }
    assert!(saw_retryable);

    // Retry replays the identical submission.
    repo.push_answer(Ok(answer(false, 0, 1, 10)));
    controller.handle(UiEvent::Retry);
    controller.settle().await;
    assert_eq!(controller.phase(), QuizPhase::ExplanationShown);

    let submits = repo.submit_calls();
    assert_eq!(submits.len(), 2);
    assert_eq!(submits[0], submits[1]);
}

#[tokio::test]
async fn submit_without_selection_is_local_validation_error() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, _effects) = new_controller(repo.clone());
    start_active(&repo, &mut controller, 10).await;

    controller.handle(UiEvent::SubmitAnswer);
    assert_eq!(controller.phase(), QuizPhase::QuestionActive);
    let err = controller.state().error.clone().unwrap();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(repo.submit_calls().is_empty());

    controller.handle(UiEvent::ClearError);
    assert!(controller.state().error.is_none());
}

#[tokio::test]
async fn load_failure_returns_to_idle_and_retry_replays_start() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, _effects) = new_controller(repo.clone());

    repo.push_start(Err(QuizError::new(ErrorKind::Timeout, "request timed out")));
    controller.handle(UiEvent::InitializeQuiz { session_id: None });
    controller.settle().await;

    assert_eq!(controller.phase(), QuizPhase::Idle);
    assert_eq!(
        controller.state().error.as_ref().map(|e| e.kind),
        Some(ErrorKind::Timeout)
    );

    repo.push_start(Ok(session("abc123", 10, 1)));
    controller.handle(UiEvent::Retry);
    controller.settle().await;
    assert_eq!(controller.phase(), QuizPhase::QuestionActive);
    assert_eq!(
        repo.calls()
            .iter()
            .filter(|c| **c == Call::StartQuiz)
            .count(),
        2
    );
}

#[tokio::test]
async fn auth_failure_is_not_retryable() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, mut effects) = new_controller(repo.clone());

    repo.push_start(Err(QuizError::with_code(
        ErrorKind::Authentication,
        "session expired",
        401,
    )));
    controller.handle(UiEvent::InitializeQuiz { session_id: None });
    controller.settle().await;
    assert_eq!(controller.phase(), QuizPhase::Idle);

    while let Ok(effect) = effects.try_recv() {
        assert!(!matches!(effect, Effect::ShowRetryableError { .. }));
    }

    // Retry has nothing stored; no network call happens.
    controller.handle(UiEvent::Retry);
    controller.settle().await;
    assert_eq!(
        repo.calls()
            .iter()
            .filter(|c| **c == Call::StartQuiz)
            .count(),
        1
    );
}

#[tokio::test]
async fn abandon_flow_is_confirmed_and_idempotent() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, mut effects) = new_controller(repo.clone());
    start_active(&repo, &mut controller, 10).await;

    controller.tick();
    controller.tick();
    assert_eq!(controller.state().elapsed_seconds, 2);

    controller.handle(UiEvent::RequestAbandon);
    assert!(controller.state().abandon_prompt);
    assert_eq!(controller.phase(), QuizPhase::QuestionActive);
    assert!(matches!(
        effects.try_recv(),
        Ok(Effect::ShowAbandonConfirmation)
    ));

    // Cancelling returns to the prior state unchanged.
    controller.handle(UiEvent::CancelAbandon);
    assert!(!controller.state().abandon_prompt);
    assert_eq!(controller.phase(), QuizPhase::QuestionActive);

    controller.handle(UiEvent::RequestAbandon);
    controller.handle(UiEvent::ConfirmAbandon);
    assert_eq!(controller.phase(), QuizPhase::Abandoned);

    // Abandonment freezes the question clock.
    controller.tick();
    controller.tick();
    assert_eq!(controller.state().elapsed_seconds, 2);

    // Repeat confirm is a no-op: one abandon call, one NavigateBack.
    controller.handle(UiEvent::ConfirmAbandon);
    assert_eq!(controller.phase(), QuizPhase::Abandoned);
    let abandons = repo
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::AbandonSession(_)))
        .count();
    assert_eq!(abandons, 1);

    let mut navigate_back = 0;
    let mut confirmations = 0;
    while let Ok(effect) = effects.try_recv() {
        match effect {
            Effect::NavigateBack => navigate_back += 1,
            Effect::ShowAbandonConfirmation => confirmations += 1,
            other => panic!("unexpected effect {other:?}"),
        }
    }
    assert_eq!(navigate_back, 1);
    assert_eq!(confirmations, 1);
}

#[tokio::test]
async fn abandon_wins_over_inflight_submission() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, _effects) = new_controller(repo.clone());
    start_active(&repo, &mut controller, 10).await;

    controller.handle(UiEvent::SelectAnswer("C".into()));
    repo.push_answer(Ok(answer(true, 10, 1, 10)));
    controller.handle(UiEvent::SubmitAnswer);
    assert_eq!(controller.phase(), QuizPhase::AnswerSubmitting);

    controller.handle(UiEvent::ConfirmAbandon);
    assert_eq!(controller.phase(), QuizPhase::Abandoned);
    assert!(!controller.has_pending());

    // The dropped submission applies nothing after termination.
    controller.settle().await;
    assert_eq!(controller.phase(), QuizPhase::Abandoned);
    assert_eq!(controller.state().score, 0);
    assert!(controller.state().last_result.is_none());
}

#[tokio::test]
async fn completion_emits_navigate_to_results_once() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, mut effects) = new_controller(repo.clone());
    start_active(&repo, &mut controller, 1).await;

    controller.tick();
    assert_eq!(controller.state().elapsed_seconds, 1);

    controller.handle(UiEvent::SelectAnswer("D".into()));
    repo.push_answer(Ok(answer(true, 100, 1, 1)));
    controller.handle(UiEvent::SubmitAnswer);
    controller.settle().await;
    assert_eq!(controller.phase(), QuizPhase::ExplanationShown);

    controller.handle(UiEvent::NextQuestion);
    assert_eq!(controller.phase(), QuizPhase::Completed);

    // Completion freezes the question clock.
    controller.tick();
    controller.tick();
    assert_eq!(controller.state().elapsed_seconds, 1);

    // Terminal state is single: abandoning after completion is a no-op.
    controller.handle(UiEvent::ConfirmAbandon);
    assert_eq!(controller.phase(), QuizPhase::Completed);
    assert!(repo
        .calls()
        .iter()
        .all(|c| !matches!(c, Call::AbandonSession(_))));

    let mut navigations = 0;
    while let Ok(effect) = effects.try_recv() {
        if let Effect::NavigateToResults { session_id } = effect {
            assert_eq!(session_id, "abc123");
            navigations += 1;
        }
    }
    assert_eq!(navigations, 1);
}

#[tokio::test]
async fn elapsed_clock_freezes_on_explanation_and_resets_on_next() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, _effects) = new_controller(repo.clone());
    start_active(&repo, &mut controller, 10).await;

    controller.tick();
    controller.tick();
    controller.tick();
    assert_eq!(controller.state().elapsed_seconds, 3);

    controller.handle(UiEvent::SelectAnswer("A".into()));
    repo.push_answer(Ok(answer(false, 0, 1, 10)));
    controller.handle(UiEvent::SubmitAnswer);
    controller.settle().await;
    assert_eq!(controller.phase(), QuizPhase::ExplanationShown);

    // Frozen: ticks no longer accumulate.
    controller.tick();
    controller.tick();
    assert_eq!(controller.state().elapsed_seconds, 3);

    repo.push_status(Ok(session("abc123", 10, 2)));
    controller.handle(UiEvent::NextQuestion);
    controller.settle().await;
    assert_eq!(controller.state().elapsed_seconds, 0);
    controller.tick();
    assert_eq!(controller.state().elapsed_seconds, 1);
}

#[tokio::test]
async fn out_of_order_question_from_server_is_rejected() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, _effects) = new_controller(repo.clone());
    start_active(&repo, &mut controller, 10).await;

    controller.handle(UiEvent::SelectAnswer("A".into()));
    repo.push_answer(Ok(answer(true, 10, 1, 10)));
    controller.handle(UiEvent::SubmitAnswer);
    controller.settle().await;

    // Server skips ahead to question 5; the +1 invariant rejects it.
    repo.push_status(Ok(session("abc123", 10, 5)));
    controller.handle(UiEvent::NextQuestion);
    controller.settle().await;

    assert_eq!(controller.phase(), QuizPhase::ExplanationShown);
    assert_eq!(controller.state().question_number(), Some(1));
    assert_eq!(
        controller.state().error.as_ref().map(|e| e.kind),
        Some(ErrorKind::Unknown)
    );
}

#[tokio::test]
async fn advance_failure_stays_on_explanation_with_retry() {
    let repo = Arc::new(ScriptedRepository::new());
    let (mut controller, _effects) = new_controller(repo.clone());
    start_active(&repo, &mut controller, 10).await;

    controller.handle(UiEvent::SelectAnswer("A".into()));
    repo.push_answer(Ok(answer(true, 10, 1, 10)));
    controller.handle(UiEvent::SubmitAnswer);
    controller.settle().await;

    repo.push_status(Err(server_error("status fetch failed")));
    controller.handle(UiEvent::NextQuestion);
    controller.settle().await;
    assert_eq!(controller.phase(), QuizPhase::ExplanationShown);
    assert!(controller.state().error.is_some());

    repo.push_status(Ok(session("abc123", 10, 2)));
    controller.handle(UiEvent::Retry);
    controller.settle().await;
    assert_eq!(controller.phase(), QuizPhase::QuestionActive);
    assert_eq!(controller.state().question_number(), Some(2));
}

#[tokio::test]
async fn spawned_session_runs_through_the_event_queue() {
    let repo = Arc::new(ScriptedRepository::new());
    repo.push_start(Ok(session("abc123", 10, 1)));

    let (handle, mut state_rx, _effects) =
        SessionHandle::spawn(repo.clone(), Duration::from_millis(10));
    assert!(handle.send(UiEvent::InitializeQuiz { session_id: None }).await);

    let reached = tokio::time::timeout(
        Duration::from_secs(5),
        state_rx.wait_for(|s| s.phase == QuizPhase::QuestionActive),
    )
    .await;
    assert!(reached.is_ok(), "controller never reached QuestionActive");

    handle.shutdown().await;
}
