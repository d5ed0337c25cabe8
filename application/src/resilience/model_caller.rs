//! Single-model invocation with timeout and retry
//!
//! [`ModelCaller`] runs one request against one model. Every attempt takes a
//! rate-limit slot first, is bounded by the per-call timeout, and transient
//! failures are retried with jittered exponential backoff.

use crate::config::CallerSettings;
use crate::ports::completion_gateway::{
    CompletionGateway, CompletionRequest, CompletionResponse, GatewayError, is_transient_status,
};
use crate::resilience::rate_limiter::{RateLimited, RateLimiter};
use boardroom_domain::ErrorCategory;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Typed failure of a model call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    RateLimited(#[from] RateLimited),

    #[error("Upstream error{}: {message}", status_suffix(.status))]
    Upstream {
        status: Option<u16>,
        message: String,
        transient: bool,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(s) => format!(" (HTTP {})", s),
        None => String::new(),
    }
}

impl CallError {
    /// Timeouts, rate limits and server-side failures
    pub fn is_transient(&self) -> bool {
        match self {
            CallError::Timeout(_) | CallError::RateLimited(_) => true,
            CallError::Upstream { transient, .. } => *transient,
            CallError::InvalidResponse(_) => false,
        }
    }

    /// Whether [`ModelCaller`] itself retries this failure.
    ///
    /// A rate-limit rejection already waited the full bound inside the
    /// limiter, so it goes straight back to the router.
    pub fn is_retryable(&self) -> bool {
        match self {
            CallError::RateLimited(_) => false,
            other => other.is_transient(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        if self.is_transient() {
            ErrorCategory::TransientCall
        } else {
            ErrorCategory::PermanentCall
        }
    }
}

impl CallError {
    /// Classify a gateway failure; a timeout reported by the transport
    /// counts against the same bound as one enforced here
    fn from_gateway(e: GatewayError, timeout: Duration) -> Self {
        match e {
            GatewayError::Timeout => CallError::Timeout(timeout),
            GatewayError::Connection(message) => CallError::Upstream {
                status: None,
                message,
                transient: true,
            },
            GatewayError::Status { status, message } => CallError::Upstream {
                status: Some(status),
                message,
                transient: is_transient_status(status),
            },
            GatewayError::InvalidResponse(message) => CallError::InvalidResponse(message),
        }
    }
}

/// A successful call
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub response: CompletionResponse,
    /// Attempts made, including the successful one
    pub attempts: u32,
    /// Wall time across all attempts, backoff included
    pub latency: Duration,
}

/// Resilient wrapper around a [`CompletionGateway`] for one model at a time
pub struct ModelCaller<G: CompletionGateway + 'static> {
    gateway: Arc<G>,
    limiter: Arc<RateLimiter>,
    settings: CallerSettings,
}

impl<G: CompletionGateway + 'static> ModelCaller<G> {
    pub fn new(gateway: Arc<G>, limiter: Arc<RateLimiter>, settings: CallerSettings) -> Self {
        Self {
            gateway,
            limiter,
            settings,
        }
    }

    pub fn settings(&self) -> &CallerSettings {
        &self.settings
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, CallError> {
        self.limiter.acquire(request.model.provider()).await?;

        let timeout = self.settings.timeout();
        let response = match tokio::time::timeout(timeout, self.gateway.complete(request)).await {
            Ok(result) => result.map_err(|e| CallError::from_gateway(e, timeout))?,
            Err(_) => return Err(CallError::Timeout(timeout)),
        };

        if response.content.trim().is_empty() {
            return Err(CallError::InvalidResponse(
                "completion has no content".to_string(),
            ));
        }
        Ok(response)
    }

    /// Call `request.model`, retrying transient failures per policy.
    pub async fn call(&self, request: &CompletionRequest) -> Result<CallOutcome, CallError> {
        let started = tokio::time::Instant::now();
        let policy = &self.settings.retry;
        let mut retries = 0u32;

        loop {
            let error = match self.attempt(request).await {
                Ok(response) => {
                    debug!(
                        model = %request.model,
                        attempts = retries + 1,
                        "Completion succeeded"
                    );
                    return Ok(CallOutcome {
                        response,
                        attempts: retries + 1,
                        latency: started.elapsed(),
                    });
                }
                Err(e) => e,
            };

            if !error.is_retryable() || !policy.should_retry(retries) {
                warn!(
                    model = %request.model,
                    attempts = retries + 1,
                    error = %error,
                    "Completion failed"
                );
                return Err(error);
            }

            let jitter = rand::thread_rng().gen_range(-1.0..=1.0);
            let delay = policy.backoff(retries, jitter);
            retries += 1;
            warn!(
                model = %request.model,
                retry = retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
