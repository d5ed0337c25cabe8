//! OpenRouter completion gateway implementation

use super::protocol::{ChatRequest, parse_completion, parse_models, status_error};
use crate::config::FileApiConfig;
use async_trait::async_trait;
use boardroom_application::{
    CompletionGateway, CompletionRequest, CompletionResponse, GatewayError,
};
use boardroom_domain::Model;
use std::time::Duration;
use tracing::{debug, info};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Completion gateway for OpenRouter-compatible HTTP APIs.
///
/// Performs exactly one HTTP exchange per call. Retries, timeouts and
/// rate limiting belong to the caller.
pub struct OpenRouterGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    referer: String,
    title: String,
}

impl OpenRouterGateway {
    pub fn new(config: &FileApiConfig, api_key: impl Into<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        info!(base_url = %config.base_url, "OpenRouterGateway initialized");

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<String, GatewayError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Upstream returned an error status");
            return Err(status_error(status.as_u16(), &body));
        }
        Ok(body)
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Connection(e.to_string())
    }
}

#[async_trait]
impl CompletionGateway for OpenRouterGateway {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        debug!(model = %request.model, messages = request.messages.len(), "POST chat/completions");
        let builder = self
            .client
            .post(self.endpoint("chat/completions"))
            .json(&ChatRequest::from_request(request));
        let body = self.send(builder).await?;
        parse_completion(&body)
    }

    async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        let body = self.send(self.client.get(self.endpoint("models"))).await?;
        let models = parse_models(&body)?;
        info!(count = models.len(), "Fetched available models");
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardroom_domain::Message;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the raw request text
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api/v1", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&raw) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });

        (base_url, handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn gateway(base_url: String) -> OpenRouterGateway {
        let config = FileApiConfig {
            base_url,
            ..Default::default()
        };
        OpenRouterGateway::new(&config, "test-key").unwrap()
    }

    #[tokio::test]
    async fn test_complete_sends_headers_and_parses_reply() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"model":"openai/gpt-4","choices":[{"message":{"role":"assistant","content":"Invest in hiring."}}],"usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}"#,
        )
        .await;

        let request = CompletionRequest::new(Model::Gpt4, vec![Message::user("Should we hire?")]);
        let response = gateway(base_url).complete(&request).await.unwrap();
        assert_eq!(response.content, "Invest in hiring.");
        assert_eq!(response.served_model, Some(Model::Gpt4));
        assert_eq!(response.usage.unwrap().total_tokens, 15);

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("post /api/v1/chat/completions"));
        assert!(raw.contains("authorization: bearer test-key"));
        assert!(raw.contains("http-referer: https://ai-boardroom.local"));
        assert!(raw.contains("x-title: ai boardroom"));
        assert!(raw.contains("\"model\":\"openai/gpt-4\""));
    }

    #[tokio::test]
    async fn test_server_error_is_transient_status() {
        let (base_url, server) = serve_once(
            "503 Service Unavailable",
            r#"{"error":{"message":"upstream overloaded"}}"#,
        )
        .await;

        let request = CompletionRequest::new(Model::Gpt4, vec![Message::user("Hi")]);
        let err = gateway(base_url).complete(&request).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Status {
                status: 503,
                message: "upstream overloaded".to_string()
            }
        );
        assert!(err.is_transient());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_available_models() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"data":[{"id":"google/gemini-pro"}]}"#).await;

        let models = gateway(base_url).available_models().await.unwrap();
        assert_eq!(models, vec![Model::GeminiPro]);

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /api/v1/models"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = CompletionRequest::new(Model::Gpt4, vec![Message::user("Hi")]);
        let err = gateway(format!("http://{}", addr))
            .complete(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Connection(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let gw = gateway("https://openrouter.ai/api/v1/".to_string());
        assert_eq!(gw.endpoint("models"), "https://openrouter.ai/api/v1/models");
    }
}
