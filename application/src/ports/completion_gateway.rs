//! Completion gateway port
//!
//! Defines the interface for talking to an upstream chat-completion API.

use async_trait::async_trait;
use boardroom_domain::{Message, Model, TokenUsage};
use thiserror::Error;

/// Default generation parameters
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// One chat-completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: Model,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: Model, messages: Vec<Message>) -> Self {
        Self {
            model,
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Same request aimed at a different model
    pub fn for_model(&self, model: Model) -> Self {
        Self {
            model,
            ..self.clone()
        }
    }
}

/// A successful completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: String,
    /// Model the upstream reports having served, when it says
    pub served_model: Option<Model>,
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            served_model: None,
            usage: None,
        }
    }
}

/// Errors that can occur during gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Connection(_) | GatewayError::Timeout => true,
            GatewayError::Status { status, .. } => is_transient_status(*status),
            GatewayError::InvalidResponse(_) => false,
        }
    }
}

/// 408, 429 and every 5xx are worth retrying; other statuses are not
pub fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..600).contains(&status)
}

/// Gateway for chat completions
///
/// This port defines how the application layer reaches completion models.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Run one completion request; no retries at this level
    async fn complete(&self, request: &CompletionRequest)
    -> Result<CompletionResponse, GatewayError>;

    /// Models the upstream currently offers
    async fn available_models(&self) -> Result<Vec<Model>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(is_transient_status(429));
        assert!(is_transient_status(408));
        assert!(is_transient_status(503));
        assert!(!is_transient_status(400));
        assert!(!is_transient_status(401));
        assert!(!is_transient_status(404));
    }

    #[test]
    fn test_error_transience() {
        assert!(GatewayError::Timeout.is_transient());
        assert!(GatewayError::Connection("reset".into()).is_transient());
        assert!(!GatewayError::InvalidResponse("no choices".into()).is_transient());
        assert!(
            !GatewayError::Status {
                status: 401,
                message: "bad key".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn test_request_defaults() {
        let req = CompletionRequest::new(Model::Gpt4, vec![Message::user("hi")]);
        assert_eq!(req.max_tokens, 500);
        assert_eq!(req.for_model(Model::GeminiPro).model, Model::GeminiPro);
    }
}
