//! Retry policy as a plain value object
//!
//! The policy only computes the schedule; callers decide whether and how
//! to sleep. That keeps it testable without clocks or network.

use std::time::Duration;

/// Bounded retry schedule with doubling backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (1 = no retry)
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each subsequent retry
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Backoff before retrying after the given failed attempt
    /// (0-based), or `None` when the budget is exhausted.
    pub fn backoff_after(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        Some(self.initial_backoff * 2u32.pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(100))
    }
}
