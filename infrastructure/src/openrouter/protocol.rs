//! Wire types for the OpenRouter chat completions API.
//!
//! - **Request**: `POST /chat/completions` with model, messages and
//!   generation parameters
//! - **Response**: `choices[0].message.content` plus optional `usage`
//! - **Models**: `GET /models` returns `{"data": [{"id": ...}, ...]}`

use boardroom_application::{CompletionRequest, CompletionResponse, GatewayError};
use boardroom_domain::{Message, Model, TokenUsage};
use serde::{Deserialize, Serialize};

/// Longest slice of an error body carried into [`GatewayError::Status`]
const MAX_ERROR_BODY: usize = 300;

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub max_tokens: u32,
    pub temperature: f32,
}

impl<'a> ChatRequest<'a> {
    pub fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: request.model.as_str(),
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

/// Chat completion response body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Model that served the request, as reported upstream
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    #[serde(default)]
    pub cost: Option<f64>,
}

impl From<Usage> for TokenUsage {
    fn from(u: Usage) -> Self {
        TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
            cost_usd: u.cost,
        }
    }
}

/// Upstream error envelope: `{"error": {"message": ...}}`
#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    message: String,
}

/// `GET /models` response body
#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}

/// Parse a successful completion body.
///
/// Unparseable bodies and bodies without any text are
/// [`GatewayError::InvalidResponse`].
pub fn parse_completion(body: &str) -> Result<CompletionResponse, GatewayError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("malformed completion body: {}", e)))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| GatewayError::InvalidResponse("completion has no content".to_string()))?;

    Ok(CompletionResponse {
        content,
        served_model: parsed.model.map(|m| Model::from(m.as_str())),
        usage: parsed.usage.map(TokenUsage::from),
    })
}

/// Parse a `GET /models` body
pub fn parse_models(body: &str) -> Result<Vec<Model>, GatewayError> {
    let parsed: ModelList = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("malformed model list: {}", e)))?;
    Ok(parsed
        .data
        .into_iter()
        .map(|entry| Model::from(entry.id.as_str()))
        .collect())
}

/// Map a non-success HTTP status and its body to a [`GatewayError`].
///
/// Prefers the upstream's own error message when the body carries one.
pub fn status_error(status: u16, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().chars().take(MAX_ERROR_BODY).collect());

    GatewayError::Status { status, message }
}
