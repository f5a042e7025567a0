//! The cancellable periodic-tick primitive.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A background task emitting one `()` per period over a channel.
///
/// The tick loop is explicitly stopped, not merely garbage-collected: every
/// iteration checks a stop flag, [`Ticker::stop`] raises it, and dropping
/// the handle aborts the task outright. `stop` is idempotent.
pub struct Ticker {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn a ticker with the given period (1 s in production; tests pass
    /// something shorter). The first tick fires one full period after spawn.
    pub fn spawn(period: Duration) -> (Self, mpsc::Receiver<()>) {
        let (tick_tx, tick_rx) = mpsc::channel(1);
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                        // A slow consumer drops ticks rather than stalling
                        // the loop; a gone consumer ends it.
                        if let Err(mpsc::error::TrySendError::Closed(_)) = tick_tx.try_send(()) {
                            break;
                        }
                    }
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        (
            Self {
                stop: stop_tx,
                task: Some(task),
            },
            tick_rx,
        )
    }

    /// Stop the tick loop. No tick is delivered after this returns.
    pub fn stop(&mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
