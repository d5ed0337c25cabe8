//! Application layer for ai-boardroom
//!
//! This crate contains use cases, port definitions, the resilient model
//! invocation client, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod resilience;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::{CallerSettings, DiscussionSettings};
pub use ports::{
    completion_gateway::{
        CompletionGateway, CompletionRequest, CompletionResponse, GatewayError,
        is_transient_status,
    },
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    discussion_store::{DiscussionStore, DiscussionSummary, NoDiscussionStore, StoreError},
    progress::{DiscussionProgress, NoProgress},
};
pub use resilience::{
    fallback_router::{FallbackRouter, Invocation, ModelFailure, RouterError},
    model_caller::{CallError, CallOutcome, ModelCaller},
    rate_limiter::{RateLimitConfig, RateLimited, RateLimiter},
};
pub use use_cases::run_discussion::{
    DiscussionOrchestrator, OrchestratorContext, OrchestratorError,
};
