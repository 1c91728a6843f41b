//! Ollama provider implementation

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{prompt_messages, PromptMessage, ProviderError};

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    system_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<PromptMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

impl OllamaProvider {
    pub fn new(
        base_url: String,
        model: String,
        system_prompt: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            system_prompt,
        })
    }

    pub async fn chat(&self, context: &str) -> Result<String, ProviderError> {
        let request = OllamaRequest {
            model: &self.model,
            messages: prompt_messages(self.system_prompt.as_deref(), context),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::InvalidResponse(format!(
                "{}: {}",
                status, body
            )));
        }

        let ollama_response: OllamaResponse = response.json().await?;
        let content = ollama_response.message.content;
        if content.trim().is_empty() {
            return Err(ProviderError::InvalidResponse(
                "Empty message content".to_string(),
            ));
        }
        Ok(content)
    }
}
