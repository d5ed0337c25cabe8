//! Process-wide request gate
//!
//! A sliding-window limiter keyed by upstream tier (the model's provider
//! prefix). Every outbound attempt acquires a slot first. When no slot is
//! free the caller waits, but never longer than the configured bound.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Quota settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Admissions allowed per key within any window
    pub requests_per_window: u32,
    pub window_ms: u64,
    /// Longest a single `acquire` may wait before giving up
    pub max_wait_ms: u64,
}

impl Default for RateLimitConfig {
    /// One request per second per tier, wait at most 30s
    fn default() -> Self {
        Self {
            requests_per_window: 1,
            window_ms: 1_000,
            max_wait_ms: 30_000,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

/// The bounded wait was exceeded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Rate limited on '{key}': no slot within {max_wait:?}")]
pub struct RateLimited {
    pub key: String,
    pub max_wait: Duration,
}

/// Admission log for one key.
///
/// Keeps the instants of admissions still inside the window, so any span
/// of `window` length holds at most `quota` admissions.
#[derive(Debug, Default)]
pub struct SlidingWindow {
    admitted: VecDeque<Instant>,
}

impl SlidingWindow {
    /// Admit at `now`, or return how long until a slot frees up.
    pub fn try_admit(&mut self, now: Instant, quota: u32, window: Duration) -> Result<(), Duration> {
        while let Some(&oldest) = self.admitted.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.admitted.pop_front();
            } else {
                break;
            }
        }

        if (self.admitted.len() as u32) < quota {
            self.admitted.push_back(now);
            return Ok(());
        }

        match self.admitted.front() {
            Some(&oldest) => Err((oldest + window).saturating_duration_since(now)),
            // quota == 0: nothing is ever admitted
            None => Err(window),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.admitted.len()
    }
}

/// Shared limiter, safe under concurrent `acquire`.
///
/// The lock only guards the bookkeeping; it is released before any sleep
/// and is never held across a network call.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, SlidingWindow>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Limiter that admits everything
    pub fn unlimited() -> Self {
        Self::new(RateLimitConfig {
            requests_per_window: u32::MAX,
            window_ms: 1,
            max_wait_ms: 0,
        })
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn try_admit(&self, key: &str) -> Result<(), Duration> {
        let now = tokio::time::Instant::now().into_std();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        windows.entry(key.to_string()).or_default().try_admit(
            now,
            self.config.requests_per_window,
            self.config.window(),
        )
    }

    /// Take a slot for `key`, waiting up to the configured bound.
    pub async fn acquire(&self, key: &str) -> Result<(), RateLimited> {
        let deadline = tokio::time::Instant::now() + self.config.max_wait();

        loop {
            let wait = match self.try_admit(key) {
                Ok(()) => return Ok(()),
                Err(wait) => wait,
            };

            let now = tokio::time::Instant::now();
            if now + wait > deadline {
                debug!(key, ?wait, "Rate limit wait exceeds bound");
                return Err(RateLimited {
                    key: key.to_string(),
                    max_wait: self.config.max_wait(),
                });
            }

            debug!(key, ?wait, "Waiting for rate limit slot");
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn config(quota: u32, window_ms: u64, max_wait_ms: u64) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_window: quota,
            window_ms,
            max_wait_ms,
        }
    }

    #[test]
    fn test_window_admits_quota_then_reports_wait() {
        let base = Instant::now();
        let window = Duration::from_millis(1_000);
        let mut w = SlidingWindow::default();

        assert!(w.try_admit(base, 2, window).is_ok());
        assert!(w.try_admit(base + Duration::from_millis(100), 2, window).is_ok());
        assert_eq!(
            w.try_admit(base + Duration::from_millis(400), 2, window),
            Err(Duration::from_millis(600))
        );
        assert!(w.try_admit(base + Duration::from_millis(1_000), 2, window).is_ok());
        assert_eq!(w.in_flight(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_slot() {
        let limiter = RateLimiter::new(config(1, 1_000, 5_000));
        let start = tokio::time::Instant::now();

        limiter.acquire("openai").await.unwrap();
        limiter.acquire("openai").await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let limiter = RateLimiter::new(config(1, 1_000, 0));
        limiter.acquire("openai").await.unwrap();
        limiter.acquire("anthropic").await.unwrap();
        assert!(limiter.acquire("openai").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_wait_fails_with_rate_limited() {
        let limiter = RateLimiter::new(config(1, 10_000, 2_000));
        limiter.acquire("google").await.unwrap();

        let start = tokio::time::Instant::now();
        let err = limiter.acquire("google").await.unwrap_err();
        assert_eq!(err.key, "google");
        // Rejected without sleeping past the bound
        assert!(start.elapsed() <= Duration::from_millis(2_000));
    }

    fn admitted_times(quota: u32, window_ms: u64, callers: usize, stagger_ms: Vec<u64>) -> Vec<Duration> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        rt.block_on(async move {
            let limiter = Arc::new(RateLimiter::new(config(quota, window_ms, 3_600_000)));
            let start = tokio::time::Instant::now();
            let mut handles = Vec::new();
            for i in 0..callers {
                let limiter = Arc::clone(&limiter);
                let delay = Duration::from_millis(stagger_ms[i % stagger_ms.len()]);
                handles.push(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    limiter.acquire("shared").await.unwrap();
                    start.elapsed()
                }));
            }
            let mut times = Vec::new();
            for h in handles {
                times.push(h.await.unwrap());
            }
            times.sort();
            times
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_window_admissions_bounded_by_quota(
            quota in 1u32..5,
            window_ms in 1u64..1_000,
            gaps_ms in proptest::collection::vec(0u64..400, 1..64),
        ) {
            let base = Instant::now();
            let window = Duration::from_millis(window_ms);
            let mut w = SlidingWindow::default();
            let mut admitted: Vec<Instant> = Vec::new();
            let mut now = base;

            for gap in gaps_ms {
                now += Duration::from_millis(gap);
                let recent = admitted
                    .iter()
                    .filter(|&&t| now.duration_since(t) < window)
                    .count();
                match w.try_admit(now, quota, window) {
                    Ok(()) => {
                        prop_assert!(recent < quota as usize);
                        admitted.push(now);
                    }
                    Err(wait) => {
                        prop_assert_eq!(recent, quota as usize);
                        prop_assert!(wait > Duration::ZERO && wait <= window);
                    }
                }
                prop_assert!(w.in_flight() <= quota as usize);
            }

            let q = quota as usize;
            for i in 0..admitted.len().saturating_sub(q) {
                prop_assert!(admitted[i + q].duration_since(admitted[i]) >= window);
            }
        }

        #[test]
        fn prop_never_exceeds_quota_per_window(
            quota in 1u32..4,
            window_ms in 10u64..500,
            callers in 1usize..24,
            stagger_ms in proptest::collection::vec(0u64..1_000, 1..8),
        ) {
            let times = admitted_times(quota, window_ms, callers, stagger_ms);
            prop_assert_eq!(times.len(), callers);

            let window = Duration::from_millis(window_ms);
            let q = quota as usize;
            for i in 0..times.len().saturating_sub(q) {
                prop_assert!(
                    times[i + q] - times[i] >= window,
                    "{} admissions within {:?}: {:?}",
                    q + 1,
                    window,
                    &times[i..=i + q]
                );
            }
        }
    }
}
