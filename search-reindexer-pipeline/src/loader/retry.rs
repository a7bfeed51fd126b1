//! Retry policy for connection-level failures.

use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Default wait between attempts.
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(5);

/// How the wait between attempts evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Always wait `retry_wait`.
    Fixed,
    /// Double the wait after every attempt, capped at `max_wait`.
    Exponential { max_wait: Duration },
}

/// Bounds on how often and how patiently a request is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_wait: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_wait: DEFAULT_RETRY_WAIT,
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_wait: Duration) -> Self {
        Self {
            max_retries,
            retry_wait,
            backoff: Backoff::Fixed,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Fresh state for one call.
    pub fn start(&self) -> RetryState {
        RetryState {
            attempt: 0,
            max_attempts: self.max_retries.saturating_add(1),
            backoff: self.retry_wait,
            kind: self.backoff,
        }
    }
}

/// Progress of a single retried call.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
    backoff: Duration,
    kind: Backoff,
}

impl RetryState {
    /// Count the attempt about to be made.
    pub fn record_attempt(&mut self) {
        self.attempt += 1;
    }

    /// Attempts made so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Wait before the next attempt, advancing the backoff.
    pub fn next_wait(&mut self) -> Duration {
        let wait = self.backoff;
        if let Backoff::Exponential { max_wait } = self.kind {
            self.backoff = std::cmp::min(self.backoff.saturating_mul(2), max_wait);
        }
        wait
    }
}
