//! Model invocation resilience from TOML (`[resilience]` section)

use boardroom_application::{CallerSettings, RateLimitConfig};
use boardroom_domain::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Timeouts, retries, rate limiting and fallback pacing.
///
/// # Example
///
/// ```toml
/// [resilience]
/// timeout_seconds = 30
/// max_retries = 3
/// backoff_base_ms = 1000
/// backoff_max_ms = 30000
/// jitter_ratio = 0.25
/// requests_per_window = 1
/// window_ms = 1000
/// max_wait_ms = 30000
/// candidate_pause_ms = 500
/// reorder_by_health = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResilienceConfig {
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    /// Fraction of each backoff randomized in either direction
    pub jitter_ratio: f64,
    /// Requests admitted per provider within one window
    pub requests_per_window: u32,
    pub window_ms: u64,
    /// Longest a call waits for a rate-limit slot
    pub max_wait_ms: u64,
    /// Pause before trying the next fallback model
    pub candidate_pause_ms: u64,
    pub reorder_by_health: bool,
}

impl Default for FileResilienceConfig {
    fn default() -> Self {
        let caller = CallerSettings::default();
        let limits = RateLimitConfig::default();
        Self {
            timeout_seconds: caller.timeout().as_secs(),
            max_retries: caller.retry.max_retries,
            backoff_base_ms: caller.retry.base_delay_ms,
            backoff_max_ms: caller.retry.max_delay_ms,
            jitter_ratio: caller.retry.jitter_ratio,
            requests_per_window: limits.requests_per_window,
            window_ms: limits.window_ms,
            max_wait_ms: limits.max_wait_ms,
            candidate_pause_ms: caller.candidate_pause_ms,
            reorder_by_health: caller.reorder_by_health,
        }
    }
}

impl FileResilienceConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay_ms: self.backoff_base_ms,
            max_delay_ms: self.backoff_max_ms,
            jitter_ratio: self.jitter_ratio,
        }
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_window: self.requests_per_window,
            window_ms: self.window_ms,
            max_wait_ms: self.max_wait_ms,
        }
    }

    /// Caller settings; generation parameters come from `[discussion]`.
    pub fn caller_settings(&self, max_tokens: u32, temperature: f32) -> CallerSettings {
        CallerSettings {
            timeout_ms: self.timeout_seconds.saturating_mul(1_000),
            retry: self.retry_policy(),
            candidate_pause_ms: self.candidate_pause_ms,
            max_tokens,
            temperature,
            reorder_by_health: self.reorder_by_health,
        }
    }
}
