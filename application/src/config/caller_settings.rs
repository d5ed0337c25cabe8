//! Model invocation settings
//!
//! [`CallerSettings`] groups everything the resilient client needs to know
//! about a single outbound call: how long to wait, how to retry, how long to
//! pause between fallback candidates, and the generation parameters.

use boardroom_domain::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::completion_gateway::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// Per-call resilience and generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerSettings {
    /// Timeout for a single attempt
    pub timeout_ms: u64,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
    /// Pause before moving to the next fallback candidate
    pub candidate_pause_ms: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Try healthier models first within a fallback chain
    pub reorder_by_health: bool,
}

impl Default for CallerSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            retry: RetryPolicy::default(),
            candidate_pause_ms: 500,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            reorder_by_health: true,
        }
    }
}

impl CallerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn candidate_pause(&self) -> Duration {
        Duration::from_millis(self.candidate_pause_ms)
    }

    // ==================== Builder Methods ====================

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_candidate_pause(mut self, pause: Duration) -> Self {
        self.candidate_pause_ms = pause.as_millis() as u64;
        self
    }
}
