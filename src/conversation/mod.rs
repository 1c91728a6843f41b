//! Conversation types and the storage seam
//!
//! A conversation is an ordered log of role-tagged messages keyed by an opaque
//! identifier. Storage backends implement [`ConversationStore`].

mod in_memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use in_memory::InMemoryStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "bot" => Some(Role::Bot),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored conversation, serialized exactly as the API returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Start an empty conversation under a freshly minted identifier
    pub fn new() -> Self {
        Self::with_id(new_conversation_id())
    }

    pub fn with_id(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            messages: Vec::new(),
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Mint a new opaque conversation identifier
pub fn new_conversation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Errors raised by conversation stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conversation already exists: {0}")]
    Duplicate(String),

    #[error("Conversation not found: {0}")]
    NotFound(String),
}

/// Persistent log of conversations
///
/// Implementations only guarantee per-call atomicity. Two callers appending to
/// the same conversation at the same time may interleave their messages.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Fetch a conversation by identifier, `None` if it does not exist
    async fn find(&self, conversation_id: &str) -> Result<Option<Conversation>, StoreError>;

    /// Insert a new conversation record along with its initial messages
    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Append one message to an existing conversation
    async fn append(&self, conversation_id: &str, message: &Message) -> Result<(), StoreError>;

    /// Every conversation with its full message list, in store order
    async fn list(&self) -> Result<Vec<Conversation>, StoreError>;

    /// Delete a conversation and its messages. Returns `false` if nothing matched.
    async fn delete(&self, conversation_id: &str) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(Message::bot("Hi there!")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "bot", "content": "Hi there!"}));

        let parsed: Message =
            serde_json::from_str(r#"{"role":"user","content":"Hello"}"#).unwrap();
        assert_eq!(parsed, Message::user("Hello"));
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(serde_json::from_str::<Message>(r#"{"role":"system","content":"x"}"#).is_err());
        assert_eq!(Role::parse("assistant"), None);
        assert_eq!(Role::parse("bot"), Some(Role::Bot));
    }

    #[test]
    fn test_new_conversation_is_empty() {
        let a = Conversation::new();
        let b = Conversation::new();
        assert!(a.messages.is_empty());
        assert_ne!(a.conversation_id, b.conversation_id);
        assert!(Uuid::parse_str(&a.conversation_id).is_ok());
    }
}
