//! The quiz session controller.
//!
//! One controller instance exclusively owns one session's state; every
//! mutation is serialized through it. Network results and timer ticks are
//! applied only here, so a result for question N can never land after the
//! controller advanced past N: starting any transition drops the pending
//! operation, and dropping its receiver aborts the producing task.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Loading -> QuestionActive -> AnswerSubmitting -> ExplanationShown
//!                         ^                                    |
//!                         +---------- next question -----------+
//!                                                              |
//!                                                         Completed
//! Abandoned: reachable from any non-terminal phase.
//! Errors: roll back to the prior interactive phase with `error` set.
//! ```

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::envelope::{EnvelopeRx, ResultEnvelope};
use crate::error::QuizError;
use crate::model::{AnswerResult, AnswerSubmission, QuizSession};
use crate::repository::QuizRepository;
use crate::timer::{ElapsedClock, Ticker};

use super::state::{Effect, QuizPhase, QuizState, UiEvent};
use super::submission::{build_submission, SubmissionGate};

const EVENT_QUEUE_CAPACITY: usize = 32;
const EFFECT_QUEUE_CAPACITY: usize = 16;

/// How a session load was requested, kept for retry replay.
#[derive(Debug, Clone)]
enum LoadOrigin {
    Start,
    Resume(String),
}

/// The last failed operation, stored with its exact arguments so `Retry`
/// replays it unchanged. Only retryable error kinds are stored.
#[derive(Debug, Clone)]
enum RetryOp {
    Load(LoadOrigin),
    Submit(AnswerSubmission),
    Advance,
}

/// The at-most-one operation currently in flight.
enum Pending {
    Load {
        rx: EnvelopeRx<QuizSession>,
        origin: LoadOrigin,
    },
    Submit {
        rx: EnvelopeRx<AnswerResult>,
        submission: AnswerSubmission,
    },
    Advance {
        rx: EnvelopeRx<QuizSession>,
    },
}

enum PendingEnvelope {
    Load(ResultEnvelope<QuizSession>),
    Submit(ResultEnvelope<AnswerResult>),
    Advance(ResultEnvelope<QuizSession>),
}

/// Single writer of [`QuizState`]; sole consumer of repository envelopes
/// for its session.
pub struct QuizController {
    repo: Arc<dyn QuizRepository>,
    state: QuizState,
    state_tx: watch::Sender<QuizState>,
    effects_tx: mpsc::Sender<Effect>,
    elapsed: ElapsedClock,
    gate: SubmissionGate,
    pending: Option<Pending>,
    retry: Option<RetryOp>,
}

impl QuizController {
    /// Build a controller plus the read side: a state snapshot channel and
    /// the one-shot effect queue.
    pub fn new(
        repo: Arc<dyn QuizRepository>,
    ) -> (Self, watch::Receiver<QuizState>, mpsc::Receiver<Effect>) {
        let state = QuizState::default();
        let (state_tx, state_rx) = watch::channel(state.clone());
        let (effects_tx, effects_rx) = mpsc::channel(EFFECT_QUEUE_CAPACITY);
        (
            Self {
                repo,
                state,
                state_tx,
                effects_tx,
                elapsed: ElapsedClock::new(),
                gate: SubmissionGate::new(),
                pending: None,
                retry: None,
            },
            state_rx,
            effects_rx,
        )
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn phase(&self) -> QuizPhase {
        self.state.phase
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    // ── Event handling ───────────────────────────────────────────────

    pub fn handle(&mut self, event: UiEvent) {
        debug!("ui event: {event:?} in phase {:?}", self.state.phase);
        match event {
            UiEvent::InitializeQuiz { session_id } => self.initialize(session_id),
            UiEvent::SelectAnswer(letter) => self.select_answer(letter),
            UiEvent::SubmitAnswer => self.submit_answer(),
            UiEvent::NextQuestion => self.next_question(),
            UiEvent::RequestAbandon => self.request_abandon(),
            UiEvent::ConfirmAbandon => self.confirm_abandon(),
            UiEvent::CancelAbandon => self.cancel_abandon(),
            UiEvent::ClearError => self.state.error = None,
            UiEvent::Retry => self.retry_last(),
        }
        self.publish();
    }

    /// One second of wall clock. Fed by the owning run loop's ticker.
    pub fn tick(&mut self) {
        self.elapsed.tick();
        if self.elapsed.is_running() {
            self.publish();
        }
    }

    /// Drain the in-flight operation to its terminal envelope and apply it.
    /// No-op when nothing is pending.
    pub async fn settle(&mut self) {
        while self.pending.is_some() {
            let envelope = self.recv_pending().await;
            self.apply(envelope);
        }
    }

    fn initialize(&mut self, session_id: Option<String>) {
        if self.state.phase != QuizPhase::Idle {
            warn!("InitializeQuiz ignored in phase {:?}", self.state.phase);
            return;
        }
        let origin = match session_id {
            Some(id) => LoadOrigin::Resume(id),
            None => LoadOrigin::Start,
        };
        self.begin_load(origin);
    }

    fn begin_load(&mut self, origin: LoadOrigin) {
        self.state.error = None;
        self.state.phase = QuizPhase::Loading;
        let rx = match &origin {
            LoadOrigin::Start => self.repo.start_quiz(),
            LoadOrigin::Resume(id) => self.repo.session_status(id),
        };
        self.pending = Some(Pending::Load { rx, origin });
    }

    fn select_answer(&mut self, letter: String) {
        if self.state.phase != QuizPhase::QuestionActive {
            warn!("SelectAnswer ignored in phase {:?}", self.state.phase);
            return;
        }
        let valid = self
            .state
            .session
            .as_ref()
            .and_then(|s| s.current_question.as_ref())
            .is_some_and(|q| q.has_option(&letter));
        if valid {
            self.state.selected_option = Some(letter);
        } else {
            warn!("SelectAnswer with unknown option '{letter}' ignored");
        }
    }

    fn submit_answer(&mut self) {
        if self.state.phase != QuizPhase::QuestionActive {
            // Covers the duplicate-submit case: while AnswerSubmitting the
            // attempt is rejected locally and no call is made.
            warn!("SubmitAnswer ignored in phase {:?}", self.state.phase);
            return;
        }
        let Some(session) = self.state.session.as_ref() else {
            warn!("SubmitAnswer without a session ignored");
            return;
        };
        let submission = match build_submission(session, self.state.selected_option.as_deref()) {
            Ok(sub) => sub,
            Err(err) => {
                self.state.error = Some(err);
                return;
            }
        };
        if !self.gate.try_begin() {
            warn!("submission already in flight, rejecting locally");
            return;
        }
        self.start_submit(submission);
    }

    fn start_submit(&mut self, submission: AnswerSubmission) {
        self.state.error = None;
        self.state.phase = QuizPhase::AnswerSubmitting;
        let rx = self.repo.submit_answer(submission.clone());
        self.pending = Some(Pending::Submit { rx, submission });
    }

    fn next_question(&mut self) {
        if self.state.phase != QuizPhase::ExplanationShown {
            warn!("NextQuestion ignored in phase {:?}", self.state.phase);
            return;
        }
        let Some(result) = self.state.last_result.as_ref() else {
            warn!("NextQuestion without an answer result ignored");
            return;
        };
        if result.has_next_question {
            self.start_advance();
        } else {
            self.complete();
        }
    }

    fn start_advance(&mut self) {
        // Stays in ExplanationShown while the fetch is out, so a failure
        // rolls back to exactly the prior interactive state.
        let Some(session_id) = self.state.session_id().map(str::to_string) else {
            warn!("advance without a session ignored");
            return;
        };
        self.state.error = None;
        let rx = self.repo.session_status(&session_id);
        self.pending = Some(Pending::Advance { rx });
    }

    fn complete(&mut self) {
        self.state.phase = QuizPhase::Completed;
        self.elapsed.freeze();
        self.pending = None;
        self.retry = None;
        if let Some(session_id) = self.state.session_id().map(str::to_string) {
            self.emit(Effect::NavigateToResults { session_id });
        }
    }

    fn request_abandon(&mut self) {
        if self.state.phase.is_terminal() {
            return;
        }
        self.state.abandon_prompt = true;
        self.emit(Effect::ShowAbandonConfirmation);
    }

    fn cancel_abandon(&mut self) {
        self.state.abandon_prompt = false;
    }

    /// Optimistic, idempotent local termination: the abandon call is fired
    /// and detached, and the local state wins regardless of its outcome.
    fn confirm_abandon(&mut self) {
        if self.state.phase.is_terminal() {
            debug!("ConfirmAbandon repeated after terminal state, no-op");
            return;
        }
        self.state.abandon_prompt = false;
        self.state.phase = QuizPhase::Abandoned;
        self.elapsed.freeze();
        self.state.loading = false;
        // Abandonment wins over any in-flight call.
        self.pending = None;
        self.retry = None;
        self.gate.finish();
        if let Some(session_id) = self.state.session_id() {
            self.repo.abandon_session(session_id).detach();
        }
        self.emit(Effect::NavigateBack);
    }

    fn retry_last(&mut self) {
        if self.pending.is_some() {
            warn!("Retry ignored while an operation is in flight");
            return;
        }
        match self.retry.take() {
            None => debug!("Retry with nothing to replay"),
            Some(RetryOp::Load(origin)) => {
                if self.state.phase == QuizPhase::Idle {
                    self.begin_load(origin);
                } else {
                    warn!("stored load retry no longer applies in {:?}", self.state.phase);
                }
            }
            Some(RetryOp::Submit(submission)) => {
                if self.state.phase == QuizPhase::QuestionActive && self.gate.try_begin() {
                    self.start_submit(submission);
                } else {
                    warn!("stored submit retry no longer applies in {:?}", self.state.phase);
                }
            }
            Some(RetryOp::Advance) => {
                if self.state.phase == QuizPhase::ExplanationShown {
                    self.start_advance();
                } else {
                    warn!("stored advance retry no longer applies in {:?}", self.state.phase);
                }
            }
        }
    }

    // ── Envelope application ─────────────────────────────────────────

    /// Next envelope of the in-flight operation. Pends forever when nothing
    /// is in flight; run loops guard with [`Self::has_pending`]. A producer
    /// that hangs up early is surfaced as the missing-terminal defect.
    async fn recv_pending(&mut self) -> PendingEnvelope {
        match self.pending.as_mut() {
            Some(Pending::Load { rx, .. }) => PendingEnvelope::Load(
                rx.recv()
                    .await
                    .unwrap_or(ResultEnvelope::Error(QuizError::missing_terminal())),
            ),
            Some(Pending::Submit { rx, .. }) => PendingEnvelope::Submit(
                rx.recv()
                    .await
                    .unwrap_or(ResultEnvelope::Error(QuizError::missing_terminal())),
            ),
            Some(Pending::Advance { rx }) => PendingEnvelope::Advance(
                rx.recv()
                    .await
                    .unwrap_or(ResultEnvelope::Error(QuizError::missing_terminal())),
            ),
            None => std::future::pending().await,
        }
    }

    fn apply(&mut self, envelope: PendingEnvelope) {
        // Spinner toggles do not consume the pending operation.
        if let PendingEnvelope::Load(ResultEnvelope::Loading { active })
        | PendingEnvelope::Submit(ResultEnvelope::Loading { active })
        | PendingEnvelope::Advance(ResultEnvelope::Loading { active }) = envelope
        {
            self.state.loading = active;
            self.publish();
            return;
        }

        match (self.pending.take(), envelope) {
            (Some(Pending::Load { .. }), PendingEnvelope::Load(ResultEnvelope::Success(s))) => {
                self.on_session_loaded(s)
            }
            (
                Some(Pending::Load { origin, .. }),
                PendingEnvelope::Load(ResultEnvelope::Error(e)),
            ) => self.on_load_failed(origin, e),
            (
                Some(Pending::Submit { .. }),
                PendingEnvelope::Submit(ResultEnvelope::Success(r)),
            ) => self.on_answer_result(r),
            (
                Some(Pending::Submit { submission, .. }),
                PendingEnvelope::Submit(ResultEnvelope::Error(e)),
            ) => self.on_submit_failed(submission, e),
            (Some(Pending::Advance { .. }), PendingEnvelope::Advance(ResultEnvelope::Success(s))) => {
                self.on_advanced(s)
            }
            (Some(Pending::Advance { .. }), PendingEnvelope::Advance(ResultEnvelope::Error(e))) => {
                self.on_advance_failed(e)
            }
            (pending, _) => {
                warn!("envelope did not match the in-flight operation, dropped");
                self.pending = pending;
            }
        }
        self.publish();
    }

    fn on_session_loaded(&mut self, session: QuizSession) {
        debug!(
            "session {} loaded, question {:?}",
            session.session_id,
            session.current_question.as_ref().map(|q| q.question_number)
        );
        self.state.session = Some(session);
        self.state.phase = QuizPhase::QuestionActive;
        self.state.selected_option = None;
        self.state.error = None;
        self.retry = None;
        self.elapsed.restart();
    }

    fn on_load_failed(&mut self, origin: LoadOrigin, err: QuizError) {
        self.state.phase = QuizPhase::Idle;
        self.fail(RetryOp::Load(origin), err);
    }

    fn on_answer_result(&mut self, result: AnswerResult) {
        self.gate.finish();
        self.elapsed.freeze();
        if result.current_score < self.state.score {
            warn!(
                "server score {} below last confirmed {}",
                result.current_score, self.state.score
            );
        }
        self.state.score = result.current_score;
        self.state.last_result = Some(result);
        self.state.phase = QuizPhase::ExplanationShown;
        self.state.error = None;
        self.retry = None;
    }

    /// Rollback guarantee: same phase, same question, same candidate.
    fn on_submit_failed(&mut self, submission: AnswerSubmission, err: QuizError) {
        self.gate.finish();
        self.state.phase = QuizPhase::QuestionActive;
        self.fail(RetryOp::Submit(submission), err);
    }

    fn on_advanced(&mut self, session: QuizSession) {
        let previous = self.state.question_number().unwrap_or(0);
        let next = session.current_question.as_ref().map(|q| q.question_number);
        if next != Some(previous + 1) {
            warn!(
                "out-of-order question from server: expected {}, got {next:?}",
                previous + 1
            );
            self.state.error = Some(QuizError::new(
                crate::error::ErrorKind::Unknown,
                "quiz service returned an out-of-order question",
            ));
            return;
        }
        self.state.session = Some(session);
        self.state.phase = QuizPhase::QuestionActive;
        self.state.selected_option = None;
        self.state.last_result = None;
        self.state.error = None;
        self.retry = None;
        self.elapsed.restart();
    }

    fn on_advance_failed(&mut self, err: QuizError) {
        // Still ExplanationShown; the user can retry or abandon.
        self.fail(RetryOp::Advance, err);
    }

    fn fail(&mut self, op: RetryOp, err: QuizError) {
        debug!("operation failed: {} ({:?})", err.message, err.kind);
        if err.is_retryable() {
            self.retry = Some(op);
            self.emit(Effect::ShowRetryableError {
                message: err.message.clone(),
            });
        } else {
            self.retry = None;
        }
        self.state.error = Some(err);
    }

    // ── Output ───────────────────────────────────────────────────────

    fn emit(&mut self, effect: Effect) {
        if self.effects_tx.try_send(effect).is_err() {
            warn!("effect queue full or closed, effect dropped");
        }
    }

    fn publish(&mut self) {
        self.state.elapsed_seconds = self.elapsed.seconds();
        self.state_tx.send_replace(self.state.clone());
    }
}

/// A spawned controller: run loop owning the ticker, fed by an event queue.
///
/// Dropping the handle aborts the loop; the loop's ticker and any pending
/// operation stop with it.
pub struct SessionHandle {
    events: mpsc::Sender<UiEvent>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Spawn the controller run loop. `tick_period` is one second in
    /// production; tests shorten it.
    pub fn spawn(
        repo: Arc<dyn QuizRepository>,
        tick_period: Duration,
    ) -> (
        Self,
        watch::Receiver<QuizState>,
        mpsc::Receiver<Effect>,
    ) {
        let (controller, state_rx, effects_rx) = QuizController::new(repo);
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let task = tokio::spawn(run_loop(controller, events_rx, tick_period));
        (
            Self {
                events: events_tx,
                task: Some(task),
            },
            state_rx,
            effects_rx,
        )
    }

    /// Queue a UI event. Returns false once the loop has shut down.
    pub async fn send(&self, event: UiEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// Close the event queue and wait for the loop to drain and exit.
    pub async fn shutdown(mut self) {
        let task = self.task.take();
        // Dropping the sender closes the queue, letting the loop finish.
        drop(self);
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_loop(
    mut controller: QuizController,
    mut events: mpsc::Receiver<UiEvent>,
    tick_period: Duration,
) {
    let (mut ticker, mut ticks) = Ticker::spawn(tick_period);
    loop {
        // Evaluated before the select so the guard does not re-borrow the
        // controller alongside the recv_pending future.
        let has_pending = controller.has_pending();
        tokio::select! {
            maybe_event = events.recv() => match maybe_event {
                Some(event) => controller.handle(event),
                None => break,
            },
            envelope = controller.recv_pending(), if has_pending => {
                controller.apply(envelope);
            }
            Some(()) = ticks.recv() => controller.tick(),
        }
        if controller.phase().is_terminal() && !ticker.is_stopped() {
            ticker.stop();
        }
    }
    ticker.stop();
}
