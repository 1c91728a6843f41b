//! Conversation storage using SQLite
//!
//! Provides persistent storage for conversation history. Message order is the
//! autoincrement row id, so it always matches arrival order.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::conversation::{Conversation, ConversationStore, Message, Role, StoreError};

/// SQLite-backed conversation store
pub struct MemoryStore {
    pool: SqlitePool,
}

impl MemoryStore {
    /// Open (or create) the store at the given SQLite database path
    pub async fn new(db_path: &Path) -> Result<Self, sqlx::Error> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create an in-memory store
    ///
    /// A single connection that never expires, since every new SQLite
    /// in-memory connection is a separate empty database.
    pub async fn new_in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Close the underlying pool, waiting for checked-out connections
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('user', 'bot')),
                content TEXT NOT NULL,
                FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages(conversation_id, id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_message((role, content): (String, String)) -> Message {
    Message {
        role: Role::parse(&role).unwrap_or(Role::User),
        content,
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn find(&self, conversation_id: &str) -> Result<Option<Conversation>, StoreError> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM conversations WHERE id = ?")
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT role, content
            FROM messages
            WHERE conversation_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Conversation {
            conversation_id: conversation_id.to_string(),
            messages: rows.into_iter().map(row_to_message).collect(),
        }))
    }

    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query("INSERT INTO conversations (id) VALUES (?)")
            .bind(&conversation.conversation_id)
            .execute(&mut *tx)
            .await;

        if let Err(e) = inserted {
            return Err(match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::Duplicate(conversation.conversation_id.clone())
                }
                other => StoreError::Database(other),
            });
        }

        for message in &conversation.messages {
            sqlx::query("INSERT INTO messages (conversation_id, role, content) VALUES (?, ?, ?)")
                .bind(&conversation.conversation_id)
                .bind(message.role.as_str())
                .bind(&message.content)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn append(&self, conversation_id: &str, message: &Message) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM conversations WHERE id = ?")
            .bind(conversation_id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Err(StoreError::NotFound(conversation_id.to_string()));
        }

        sqlx::query("INSERT INTO messages (conversation_id, role, content) VALUES (?, ?, ?)")
            .bind(conversation_id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Conversation>, StoreError> {
        let rows: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT c.id, m.role, m.content
            FROM conversations c
            LEFT JOIN messages m ON m.conversation_id = c.id
            ORDER BY c.rowid ASC, m.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut conversations: Vec<Conversation> = Vec::new();
        for (id, role, content) in rows {
            let starts_new = conversations
                .last()
                .map_or(true, |c| c.conversation_id != id);
            if starts_new {
                conversations.push(Conversation::with_id(id));
            }
            if let (Some(role), Some(content), Some(current)) =
                (role, content, conversations.last_mut())
            {
                current.messages.push(row_to_message((role, content)));
            }
        }

        Ok(conversations)
    }

    async fn delete(&self, conversation_id: &str) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM messages WHERE conversation_id = ?")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
