//! OpenAI-compatible provider
//!
//! Works with any API that implements the OpenAI chat completions format:
//! OpenAI itself, Groq, vLLM, LM Studio, LocalAI and similar servers.
//!
//! # Configuration
//!
//! ```toml
//! [llm]
//! provider = "openai"
//! endpoint = "https://api.groq.com/openai/v1"
//! api_key_env = "GROQ_API_KEY"
//! model = "llama-3.3-70b-versatile"
//! ```

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{prompt_messages, PromptMessage, ProviderError};

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<PromptMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error response from API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    /// Base URL for the API (e.g., https://api.openai.com/v1)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    pub default_model: String,
    pub system_prompt: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAICompatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            default_model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            timeout_secs: 120,
        }
    }
}

/// OpenAI-compatible API provider
pub struct OpenAICompatProvider {
    config: OpenAICompatConfig,
    client: Client,
}

impl OpenAICompatProvider {
    pub fn new(config: OpenAICompatConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Send a chat completion request and return the reply text
    pub async fn chat(&self, context: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let request = ChatCompletionRequest {
            model: &self.config.default_model,
            messages: prompt_messages(self.config.system_prompt.as_deref(), context),
            temperature: Some(0.7),
            max_tokens: Some(4096),
        };

        let mut req_builder = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        let response = req_builder.json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(ProviderError::InvalidResponse(format!(
                    "API error: {}",
                    error_resp.error.message
                )));
            }
            return Err(ProviderError::InvalidResponse(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

        choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("Empty message content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn local_config(base_url: String, api_key: Option<&str>) -> OpenAICompatConfig {
        OpenAICompatConfig {
            base_url,
            api_key: api_key.map(str::to_string),
            default_model: "llama-3".to_string(),
            system_prompt: None,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_chat_completion() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama-3",
                "messages": [{"role": "user", "content": "user: What is Rust?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "A systems language."},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&mock_server)
            .await;

        let provider = OpenAICompatProvider::new(local_config(
            format!("{}/v1", mock_server.uri()),
            Some("test-key"),
        ))
        .unwrap();

        let reply = provider.chat("user: What is Rust?").await.unwrap();
        assert_eq!(reply, "A systems language.");
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Invalid API key", "type": "invalid_request_error"}
            })))
            .mount(&mock_server)
            .await;

        let provider =
            OpenAICompatProvider::new(local_config(mock_server.uri(), Some("bad"))).unwrap();

        match provider.chat("user: hi").await.unwrap_err() {
            ProviderError::InvalidResponse(msg) => assert_eq!(msg, "API error: Invalid API key"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_null_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": null},
                    "finish_reason": "content_filter"
                }]
            })))
            .mount(&mock_server)
            .await;

        let provider = OpenAICompatProvider::new(local_config(mock_server.uri(), None)).unwrap();

        match provider.chat("user: hi").await.unwrap_err() {
            ProviderError::InvalidResponse(msg) => assert_eq!(msg, "Empty message content"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&mock_server)
            .await;

        let provider = OpenAICompatProvider::new(local_config(mock_server.uri(), None)).unwrap();

        assert!(matches!(
            provider.chat("user: hi").await,
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
