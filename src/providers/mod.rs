//! AI provider integrations
//!
//! Providers turn a conversation context into a reply. The rest of the crate
//! only sees the [`ResponseGenerator`] trait.

mod ollama;
mod openai_compat;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::LlmConfig;

pub use ollama::OllamaProvider;
pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Produces a natural-language reply for a context string
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, context: &str) -> Result<String, ProviderError>;
}

/// One chat turn in the wire format shared by Ollama and OpenAI-style APIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct PromptMessage {
    pub role: &'static str,
    pub content: String,
}

/// Optional system prompt followed by the context as a single user turn
pub(crate) fn prompt_messages(system_prompt: Option<&str>, context: &str) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(prompt) = system_prompt.filter(|p| !p.trim().is_empty()) {
        messages.push(PromptMessage {
            role: "system",
            content: prompt.to_string(),
        });
    }
    messages.push(PromptMessage {
        role: "user",
        content: context.to_string(),
    });
    messages
}

pub enum Provider {
    Ollama(OllamaProvider),
    OpenAI(OpenAICompatProvider),
}

impl Provider {
    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        match config.provider.to_lowercase().as_str() {
            "ollama" => {
                let url = config
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".into());
                Ok(Provider::Ollama(OllamaProvider::new(
                    url,
                    config.model.clone(),
                    config.system_prompt.clone(),
                    config.timeout_secs,
                )?))
            }
            "openai" => {
                let defaults = OpenAICompatConfig::default();
                let base_url = config.endpoint.clone().unwrap_or(defaults.base_url);
                if config.api_key.is_none() && base_url.contains("api.openai.com") {
                    return Err(ProviderError::NotConfigured(
                        "openai requires OPENAI_API_KEY".to_string(),
                    ));
                }
                Ok(Provider::OpenAI(OpenAICompatProvider::new(
                    OpenAICompatConfig {
                        base_url,
                        api_key: config.api_key.clone(),
                        default_model: config.model.clone(),
                        system_prompt: config.system_prompt.clone(),
                        timeout_secs: config.timeout_secs,
                    },
                )?))
            }
            _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama(_) => "ollama",
            Provider::OpenAI(_) => "openai",
        }
    }
}

#[async_trait]
impl ResponseGenerator for Provider {
    async fn generate(&self, context: &str) -> Result<String, ProviderError> {
        match self {
            Provider::Ollama(p) => p.chat(context).await,
            Provider::OpenAI(p) => p.chat(context).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_messages() {
        let messages = prompt_messages(Some("Be brief."), "user: hi");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "user: hi");

        assert_eq!(prompt_messages(Some("  "), "x").len(), 1);
        assert_eq!(prompt_messages(None, "x").len(), 1);
    }

    #[test]
    fn test_from_config() {
        let ollama = Provider::from_config(&LlmConfig::default()).unwrap();
        assert_eq!(ollama.name(), "ollama");

        let local = Provider::from_config(&LlmConfig {
            provider: "OpenAI".into(),
            endpoint: Some("http://localhost:8000/v1".into()),
            ..LlmConfig::default()
        })
        .unwrap();
        assert_eq!(local.name(), "openai");
    }

    #[test]
    fn test_from_config_errors() {
        let unknown = Provider::from_config(&LlmConfig {
            provider: "palm".into(),
            ..LlmConfig::default()
        });
        assert!(matches!(unknown, Err(ProviderError::UnknownProvider(_))));

        let keyless = Provider::from_config(&LlmConfig {
            provider: "openai".into(),
            ..LlmConfig::default()
        });
        assert!(matches!(keyless, Err(ProviderError::NotConfigured(_))));
    }
}
