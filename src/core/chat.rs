//! Chat engine
//!
//! The ChatEngine handles one chat turn end to end:
//! 1. Resolves (or mints) the conversation ID
//! 2. Loads the conversation history from the store
//! 3. Renders history plus the new message into a context string
//! 4. Asks the response generator for a reply
//! 5. Formats the reply
//! 6. Saves the user/bot pair to the conversation
//!
//! It also owns the create/list/delete conversation operations.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::conversation::{
    new_conversation_id, Conversation, ConversationStore, Message, StoreError,
};
use crate::providers::{ProviderError, ResponseGenerator};

use super::format::format_response;

/// Request to the chat engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message. Required; optional here so a missing field is a
    /// validation error rather than a deserialization failure.
    #[serde(default)]
    pub message: Option<String>,

    /// Optional conversation ID to continue
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            conversation_id: None,
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

/// Response from the chat engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The formatted bot reply
    pub response: String,

    /// Conversation ID for continuation
    pub conversation_id: String,
}

/// Errors from the chat engine
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Generator error: {0}")]
    Generator(#[from] ProviderError),
}

/// The core chat engine
pub struct ChatEngine {
    store: Arc<dyn ConversationStore>,
    generator: Arc<dyn ResponseGenerator>,
}

impl ChatEngine {
    pub fn new(store: Arc<dyn ConversationStore>, generator: Arc<dyn ResponseGenerator>) -> Self {
        Self { store, generator }
    }

    /// Process a chat turn and return the formatted reply
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let message = request
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ChatError::Validation("Message is required".to_string()))?;

        let conversation_id = match request.conversation_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                let id = new_conversation_id();
                tracing::debug!("Minted conversation {}", id);
                id
            }
        };

        let existing = self.store.find(&conversation_id).await?;
        let history = existing
            .as_ref()
            .map(|c| c.messages.as_slice())
            .unwrap_or_default();

        let context = build_context(history, &message);
        let raw = self.generator.generate(&context).await?;
        let response = format_response(&raw);

        let user = Message::user(message);
        let bot = Message::bot(response.clone());

        // Not serialized per conversation: concurrent turns may interleave
        if existing.is_some() {
            self.store.append(&conversation_id, &user).await?;
            self.store.append(&conversation_id, &bot).await?;
        } else {
            self.store
                .insert(&Conversation {
                    conversation_id: conversation_id.clone(),
                    messages: vec![user, bot],
                })
                .await?;
        }

        tracing::info!(
            "Saved turn to conversation {} ({} prior message(s))",
            conversation_id,
            history.len()
        );

        Ok(ChatResponse {
            response,
            conversation_id,
        })
    }

    /// Create an empty conversation and return its ID
    pub async fn create_conversation(&self) -> Result<String, ChatError> {
        let conversation = Conversation::new();
        self.store.insert(&conversation).await?;
        tracing::info!("Created conversation {}", conversation.conversation_id);
        Ok(conversation.conversation_id)
    }

    /// All conversations with their messages
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, ChatError> {
        Ok(self.store.list().await?)
    }

    /// Delete a conversation by ID
    pub async fn delete_conversation(&self, conversation_id: Option<&str>) -> Result<(), ChatError> {
        let conversation_id = conversation_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ChatError::Validation("Conversation ID is required".to_string()))?;

        if !self.store.delete(conversation_id).await? {
            return Err(ChatError::NotFound(conversation_id.to_string()));
        }

        tracing::info!("Deleted conversation {}", conversation_id);
        Ok(())
    }
}

/// Render prior turns and the new user message as `role: content` lines
pub fn build_context(history: &[Message], message: &str) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .chain(std::iter::once(format!("user: {}", message)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::InMemoryStore;
    use crate::core::test_support::{FailingGenerator, RecordingGenerator};

    fn engine_with(generator: Arc<dyn ResponseGenerator>) -> (ChatEngine, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (ChatEngine::new(store.clone(), generator), store)
    }

    #[test]
    fn test_build_context() {
        let history = vec![Message::user("Hi"), Message::bot("Hello!")];
        assert_eq!(
            build_context(&history, "How are you?"),
            "user: Hi\nbot: Hello!\nuser: How are you?"
        );
        assert_eq!(build_context(&[], "First"), "user: First");
    }

    #[tokio::test]
    async fn test_new_conversation_turn() {
        let generator = Arc::new(RecordingGenerator::replying("Sure. 1. Rest well."));
        let (engine, store) = engine_with(generator.clone());

        let response = engine.chat(ChatRequest::new("Any tips?")).await.unwrap();
        assert_eq!(response.response, "Sure.\n- Rest well.");
        assert_eq!(generator.contexts(), vec!["user: Any tips?".to_string()]);

        let saved = store.find(&response.conversation_id).await.unwrap().unwrap();
        assert_eq!(
            saved.messages,
            vec![Message::user("Any tips?"), Message::bot("Sure.\n- Rest well.")]
        );
    }

    #[tokio::test]
    async fn test_continuing_conversation_uses_history() {
        let generator = Arc::new(RecordingGenerator::replying("Noted."));
        let (engine, store) = engine_with(generator.clone());

        let first = engine.chat(ChatRequest::new("My name is Ada.")).await.unwrap();
        let second = engine
            .chat(ChatRequest::new("What is my name?").in_conversation(&first.conversation_id))
            .await
            .unwrap();

        assert_eq!(first.conversation_id, second.conversation_id);
        assert_eq!(
            generator.contexts()[1],
            "user: My name is Ada.\nbot: Noted.\nuser: What is my name?"
        );
        let saved = store.find(&first.conversation_id).await.unwrap().unwrap();
        assert_eq!(saved.messages.len(), 4);
        assert_eq!(saved.messages[2], Message::user("What is my name?"));
        assert_eq!(saved.messages[3], Message::bot("Noted."));
    }

    #[tokio::test]
    async fn test_client_supplied_id_is_kept() {
        let (engine, store) = engine_with(Arc::new(RecordingGenerator::replying("ok")));

        let response = engine
            .chat(ChatRequest::new("hello").in_conversation("my-own-id"))
            .await
            .unwrap();
        assert_eq!(response.conversation_id, "my-own-id");
        assert!(store.find("my-own-id").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_blank_id_mints_new_one() {
        let (engine, _) = engine_with(Arc::new(RecordingGenerator::replying("ok")));
        let response = engine
            .chat(ChatRequest::new("hello").in_conversation("  "))
            .await
            .unwrap();
        assert!(uuid::Uuid::parse_str(&response.conversation_id).is_ok());
    }

    #[tokio::test]
    async fn test_missing_message() {
        let generator = Arc::new(RecordingGenerator::replying("never"));
        let (engine, store) = engine_with(generator.clone());

        for request in [ChatRequest::default(), ChatRequest::new("   ")] {
            let err = engine.chat(request).await.unwrap_err();
            assert!(matches!(err, ChatError::Validation(_)));
        }
        assert!(generator.contexts().is_empty());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generator_failure_persists_nothing() {
        let (engine, store) = engine_with(Arc::new(FailingGenerator));

        let err = engine.chat(ChatRequest::new("hello")).await.unwrap_err();
        assert!(matches!(err, ChatError::Generator(_)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let (engine, _) = engine_with(Arc::new(RecordingGenerator::replying("ok")));

        let id = engine.create_conversation().await.unwrap();
        let listed = engine.list_conversations().await.unwrap();
        assert_eq!(listed, vec![Conversation::with_id(id.clone())]);

        assert!(matches!(
            engine.delete_conversation(None).await,
            Err(ChatError::Validation(_))
        ));
        assert!(matches!(
            engine.delete_conversation(Some("unknown")).await,
            Err(ChatError::NotFound(_))
        ));

        engine.delete_conversation(Some(id.as_str())).await.unwrap();
        assert!(engine.list_conversations().await.unwrap().is_empty());
    }
}
