//! Result envelopes: the wrapper around every asynchronous operation.
//!
//! A repository call produces a sequence of [`ResultEnvelope`] values over
//! time: zero or more `Loading` notifications followed by exactly one
//! terminal `Success` or `Error`. Consumers stop listening after the
//! terminal value. An operation that ends without a terminal value is a
//! defect and is surfaced as [`ErrorKind::Unknown`].
//!
//! The producing task is owned by the returned [`EnvelopeRx`]: dropping the
//! receiver aborts the task, so a cancelled call can never apply state after
//! cancellation. [`EnvelopeRx::detach`] opts out of that, for fire-and-forget
//! calls whose local outcome must not wait on the network.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::QuizError;

#[allow(unused_imports)]
use crate::error::ErrorKind;

/// One observation of an asynchronous operation.
///
/// Produced once per call, consumed exactly once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultEnvelope<T> {
    /// Spinner toggle: `active: true` when the operation starts,
    /// `active: false` just before the terminal value.
    Loading { active: bool },
    Success(T),
    Error(QuizError),
}

impl<T> ResultEnvelope<T> {
    /// Whether this envelope ends the sequence.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ResultEnvelope::Loading { .. })
    }
}

/// Receiving half of one operation's envelope sequence.
///
/// Single-producer/single-consumer; the producer task is aborted when this
/// is dropped.
pub struct EnvelopeRx<T> {
    rx: mpsc::Receiver<ResultEnvelope<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T> EnvelopeRx<T> {
    /// Next envelope, or `None` if the producer went away.
    pub async fn recv(&mut self) -> Option<ResultEnvelope<T>> {
        self.rx.recv().await
    }

    /// Drain the sequence to its terminal value.
    ///
    /// A producer that dies without a terminal value yields
    /// [`QuizError::missing_terminal`].
    pub async fn terminal(mut self) -> Result<T, QuizError> {
        loop {
            match self.rx.recv().await {
                Some(ResultEnvelope::Loading { .. }) => continue,
                Some(ResultEnvelope::Success(value)) => return Ok(value),
                Some(ResultEnvelope::Error(err)) => return Err(err),
                None => return Err(QuizError::missing_terminal()),
            }
        }
    }

    /// Let the producing task run to completion even after this receiver is
    /// dropped. Used for optimistic operations (session abandonment) where
    /// the local state transition must not be tied to the network call.
    pub fn detach(mut self) {
        self.task.take();
    }

    /// Build an already-settled sequence without spawning a task.
    ///
    /// The full `Loading(true)`, `Loading(false)`, terminal sequence is
    /// queued up front. Fakes and tests use this; production operations go
    /// through [`spawn_envelope`].
    pub fn settled(result: Result<T, QuizError>) -> Self {
        let (tx, rx) = mpsc::channel(4);
        let _ = tx.try_send(ResultEnvelope::Loading { active: true });
        let _ = tx.try_send(ResultEnvelope::Loading { active: false });
        let _ = tx.try_send(match result {
            Ok(value) => ResultEnvelope::Success(value),
            Err(err) => ResultEnvelope::Error(err),
        });
        Self { rx, task: None }
    }
}

impl<T> Drop for EnvelopeRx<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<T> std::fmt::Debug for EnvelopeRx<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeRx")
            .field("detached", &self.task.is_none())
            .finish_non_exhaustive()
    }
}

/// Run `op` on a background task, observing it as an envelope sequence.
pub fn spawn_envelope<T, F>(op: F) -> EnvelopeRx<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, QuizError>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(4);
    let task = tokio::spawn(async move {
        let _ = tx.send(ResultEnvelope::Loading { active: true }).await;
        let outcome = op.await;
        let _ = tx.send(ResultEnvelope::Loading { active: false }).await;
        let _ = tx
            .send(match outcome {
                Ok(value) => ResultEnvelope::Success(value),
                Err(err) => ResultEnvelope::Error(err),
            })
            .await;
    });
    EnvelopeRx {
        rx,
        task: Some(task),
    }
}
