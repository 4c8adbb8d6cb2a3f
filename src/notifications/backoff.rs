//! Reconnect backoff policy.

use std::time::Duration;

use crate::config::ReconnectSettings;
use crate::constants::{INITIAL_RECONNECT_DELAY_MS, MAX_RECONNECT_ATTEMPTS};

/// Exponential backoff with a fixed attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RECONNECT_ATTEMPTS,
            initial_delay: Duration::from_millis(INITIAL_RECONNECT_DELAY_MS),
        }
    }
}

impl From<&ReconnectSettings> for ReconnectPolicy {
    fn from(settings: &ReconnectSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect number `attempt` (0-based), or `None` once the
    /// budget is spent.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        Some(
            self.initial_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        )
    }
}
