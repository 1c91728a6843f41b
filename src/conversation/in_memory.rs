//! In-memory conversation store
//!
//! Data is lost when the process exits. Used by the test suite and for
//! running the server without a database.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Conversation, ConversationStore, Message, StoreError};

/// Conversations kept in insertion order behind an async lock
#[derive(Default)]
pub struct InMemoryStore {
    conversations: RwLock<Vec<Conversation>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn find(&self, conversation_id: &str) -> Result<Option<Conversation>, StoreError> {
        let conversations = self.conversations.read().await;
        Ok(conversations
            .iter()
            .find(|c| c.conversation_id == conversation_id)
            .cloned())
    }

    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().await;
        if conversations
            .iter()
            .any(|c| c.conversation_id == conversation.conversation_id)
        {
            return Err(StoreError::Duplicate(conversation.conversation_id.clone()));
        }
        conversations.push(conversation.clone());
        tracing::debug!(
            "[InMemoryStore] Inserted conversation '{}' with {} message(s)",
            conversation.conversation_id,
            conversation.messages.len()
        );
        Ok(())
    }

    async fn append(&self, conversation_id: &str, message: &Message) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .iter_mut()
            .find(|c| c.conversation_id == conversation_id)
            .ok_or_else(|| StoreError::NotFound(conversation_id.to_string()))?;
        conversation.messages.push(message.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Conversation>, StoreError> {
        Ok(self.conversations.read().await.clone())
    }

    async fn delete(&self, conversation_id: &str) -> Result<bool, StoreError> {
        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|c| c.conversation_id != conversation_id);
        Ok(conversations.len() < before)
    }
}
