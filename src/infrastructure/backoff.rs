use crate::types::constants::{
    DEFAULT_RETRY_INITIAL_DELAY, DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_MAX_DELAY,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the wait between retries grows with the attempt number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// `initial * (attempt + 1)`
    Linear,
    /// `initial * 2^attempt`
    #[default]
    Exponential,
    /// `initial`
    Fixed,
}

/// Retry budget and backoff for HTTP requests.
///
/// `attempt` is zero-based: the delay before the first retry is
/// `delay_for(0)`. A policy with `max_attempts = 3` allows four requests in
/// total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub backoff_strategy: BackoffStrategy,
    #[serde(rename = "initialDelay", default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    #[serde(rename = "maxDelay", default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_RETRY_MAX_ATTEMPTS
}
fn default_initial_delay() -> u64 {
    DEFAULT_RETRY_INITIAL_DELAY
}
fn default_max_delay() -> u64 {
    DEFAULT_RETRY_MAX_DELAY
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            backoff_strategy: BackoffStrategy::Exponential,
            initial_delay_ms: DEFAULT_RETRY_INITIAL_DELAY,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        backoff_strategy: BackoffStrategy,
        initial_delay_ms: u64,
        max_delay_ms: u64,
    ) -> Self {
        Self {
            max_attempts,
            backoff_strategy,
            initial_delay_ms,
            max_delay_ms,
        }
    }

    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (zero-based), capped at `max_delay_ms`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let initial = self.initial_delay_ms;
        let delay = match self.backoff_strategy {
            BackoffStrategy::Linear => initial.saturating_mul(u64::from(attempt) + 1),
            BackoffStrategy::Exponential => initial.saturating_mul(2u64.saturating_pow(attempt)),
            BackoffStrategy::Fixed => initial,
        };

        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    /// Whether another attempt is allowed after `retries` retries.
    pub fn allows_retry(&self, retries: u32) -> bool {
        retries < self.max_attempts
    }
}
