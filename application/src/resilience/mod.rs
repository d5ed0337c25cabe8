//! Resilient model invocation
//!
//! - [`rate_limiter::RateLimiter`]: process-wide sliding-window gate
//! - [`model_caller::ModelCaller`]: one model, timeout plus retry/backoff
//! - [`fallback_router::FallbackRouter`]: walks a persona's model chain

pub mod fallback_router;
pub mod model_caller;
pub mod rate_limiter;
