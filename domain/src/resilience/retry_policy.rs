//! Retry policy for outbound model calls

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff with symmetric jitter.
///
/// Pure: the random jitter sample is passed in, so delays can be checked
/// without a clock or an RNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = no retries)
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds
    pub base_delay_ms: u64,
    /// Upper bound for a single delay before jitter, in milliseconds
    pub max_delay_ms: u64,
    /// Jitter as a fraction of the delay; 0.25 means ±25%
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    /// 3 retries, 1s base delay, 30s cap, ±25% jitter
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            jitter_ratio: 0.25,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether another retry is allowed after `retries_done` retries
    pub fn should_retry(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }

    /// Delay before retry number `retry` (0 = first retry), without jitter
    pub fn base_backoff_ms(&self, retry: u32) -> u64 {
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        self.base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms)
    }

    /// Delay before retry number `retry`, with jitter.
    ///
    /// `jitter_sample` is expected in `[-1.0, 1.0]` and is clamped to it.
    pub fn backoff(&self, retry: u32, jitter_sample: f64) -> Duration {
        let base = self.base_backoff_ms(retry) as f64;
        let ratio = self.jitter_ratio.clamp(0.0, 1.0);
        let offset = base * ratio * jitter_sample.clamp(-1.0, 1.0);
        Duration::from_millis((base + offset).max(0.0).round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_growth_and_cap() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay_ms: 1_000,
            max_delay_ms: 5_000,
            jitter_ratio: 0.0,
        };
        assert_eq!(policy.base_backoff_ms(0), 1_000);
        assert_eq!(policy.base_backoff_ms(1), 2_000);
        assert_eq!(policy.base_backoff_ms(2), 4_000);
        assert_eq!(policy.base_backoff_ms(3), 5_000); // Capped
        assert_eq!(policy.base_backoff_ms(64), 5_000); // No overflow
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1, 0.0), Duration::from_millis(2_000));
        assert_eq!(policy.backoff(1, 1.0), Duration::from_millis(2_500));
        assert_eq!(policy.backoff(1, -1.0), Duration::from_millis(1_500));
        // Out-of-range samples are clamped
        assert_eq!(policy.backoff(1, 7.0), Duration::from_millis(2_500));
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::default(); // 3 retries
        assert_eq!(policy.max_attempts(), 4);
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(!RetryPolicy::none().should_retry(0));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"max_retries": 1}"#).unwrap();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.base_delay_ms, 1_000);
    }
}
