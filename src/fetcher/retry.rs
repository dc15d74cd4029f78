//! Per-request retry bookkeeping and the messages logged while retrying.
//!
//! A [`RetryState`] lives for exactly one logical request. The pagination
//! driver never carries one across pages, so every page starts with a full
//! budget.

use std::time::Duration;

use crate::config::calculate_backoff;

/// Attempt counter for one logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryState {
    /// Fresh state allowing `max_retries` retries after the first attempt.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            attempt: 0,
            max_retries,
            base_delay,
        }
    }

    /// Retries taken so far (0-based attempt of the next wait)
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Configured retry budget
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// No retries left
    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_retries
    }

    /// Delay before the next retry: `base_delay * 2^attempt`
    pub fn next_delay(&self) -> Duration {
        calculate_backoff(self.base_delay, self.attempt)
    }

    /// Consume one retry, returning the delay to wait before it.
    pub fn advance(&mut self) -> Duration {
        let delay = self.next_delay();
        self.attempt += 1;
        delay
    }

    /// Message logged before sleeping. Call after [`RetryState::advance`].
    pub fn format_retry(&self, delay: Duration) -> String {
        format!(
            "API rate limit hit. Retrying again in {} seconds. Retry {} of {}.",
            format_seconds(delay),
            self.attempt,
            self.max_retries
        )
    }

    /// Message logged when the budget runs out
    pub fn format_exhausted(&self, url: &str) -> String {
        format!(
            "Rate limited on {url} after {} retries; consider raising max retries or adding a delay between pages",
            self.max_retries
        )
    }
}

fn format_seconds(delay: Duration) -> String {
    let secs = delay.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("{}", delay.as_secs())
    } else {
        format!("{secs:.2}")
    }
}
