use crate::types::constants::{DEFAULT_RECONNECT_DELAY, DEFAULT_RECONNECT_MAX_ATTEMPTS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// WebSocket reconnect budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(rename = "delay", default = "default_delay")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_RECONNECT_MAX_ATTEMPTS
}
fn default_delay() -> u64 {
    DEFAULT_RECONNECT_DELAY
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RECONNECT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_RECONNECT_DELAY,
        }
    }
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
        }
    }

    /// Delay before reconnect `attempt` (one-based): `base * 2^(attempt - 1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        Duration::from_millis(
            self.base_delay_ms
                .saturating_mul(2u64.saturating_pow(exponent)),
        )
    }
}

/// Timer for reconnection logic with exponential backoff
#[derive(Debug, Clone)]
pub struct ReconnectTimer {
    attempts: u32,
    policy: ReconnectPolicy,
}

impl ReconnectTimer {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            attempts: 0,
            policy,
        }
    }

    /// Counts the next attempt and returns its delay, or `None` once the
    /// budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.policy.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.policy.delay_for(self.attempts))
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }
}

impl Default for ReconnectTimer {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}
