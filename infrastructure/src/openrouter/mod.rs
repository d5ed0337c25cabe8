//! OpenRouter adapter
//!
//! Implements the [`CompletionGateway`](boardroom_application::CompletionGateway)
//! port over the OpenRouter chat completions HTTP API.

pub mod gateway;
pub mod protocol;

pub use gateway::OpenRouterGateway;
