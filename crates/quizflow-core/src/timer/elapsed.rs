//! Per-question elapsed-time counter.

/// Counts whole seconds a question has been active.
///
/// Pure tick-driven state: the owner feeds it one `tick()` per second while
/// it is running. `freeze` retains the value the instant the session leaves
/// the active question (explanation shown, completed, abandoned);
/// `restart` zeroes it for the next question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElapsedClock {
    seconds: u64,
    running: bool,
}

impl ElapsedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin counting from zero for a newly active question.
    pub fn restart(&mut self) {
        self.seconds = 0;
        self.running = true;
    }

    /// Stop counting, retaining the current value. Idempotent.
    pub fn freeze(&mut self) {
        self.running = false;
    }

    /// Advance by one second if running.
    pub fn tick(&mut self) {
        if self.running {
            self.seconds += 1;
        }
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
