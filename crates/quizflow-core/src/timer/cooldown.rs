//! Countdown gating re-invocation of a rate-limited action.

/// Fixed-duration cooldown (e.g. a 60 s resend-code delay).
///
/// `begin` re-seeds the countdown to the configured duration every time,
/// regardless of any remaining value. The gated action is re-enabled
/// exactly when the countdown reaches zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cooldown {
    duration_secs: u32,
    remaining_secs: u32,
}

impl Cooldown {
    /// A cooldown that has never been triggered; the action starts enabled.
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            remaining_secs: 0,
        }
    }

    /// Start (or restart) the countdown at the full configured duration.
    pub fn begin(&mut self) {
        self.remaining_secs = self.duration_secs;
    }

    /// Advance by one second.
    pub fn tick(&mut self) {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
    }

    /// Abort the countdown, re-enabling the action. Used when the owning
    /// screen or session is torn down mid-countdown.
    pub fn cancel(&mut self) {
        self.remaining_secs = 0;
    }

    /// Whether the gated action may run.
    pub fn is_ready(&self) -> bool {
        self.remaining_secs == 0
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }
}
