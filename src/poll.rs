// ABOUTME: Bounded sleep-then-check schedule for waiting on the external server.
// ABOUTME: The server exposes no completion signal, so every wait is a deadline followed by checks.

use std::iter;
use std::time::Duration;

/// How long to wait before the first check, how long between checks, and how
/// many checks to make before giving up.
///
/// One attempt means a single check after `initial_wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_wait: Duration,
    pub interval: Duration,
    pub attempts: u32,
}

impl PollPolicy {
    /// Zero attempts are treated as one.
    pub fn new(initial_wait: Duration, interval: Duration, attempts: u32) -> Self {
        Self {
            initial_wait,
            interval,
            attempts: attempts.max(1),
        }
    }

    /// A single check after `wait`.
    pub fn once(wait: Duration) -> Self {
        Self::new(wait, Duration::ZERO, 1)
    }

    /// The delay to sleep before each check, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let rest = self.attempts.saturating_sub(1) as usize;
        iter::once(self.initial_wait).chain(iter::repeat_n(self.interval, rest))
    }

    /// Worst-case time spent waiting under this policy.
    pub fn budget(&self) -> Duration {
        self.delays().sum()
    }
}
