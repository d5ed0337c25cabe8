//! Resilience policy objects shared by the model invocation client

pub mod health;
pub mod retry_policy;
