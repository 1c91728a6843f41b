//! Core chat components
//!
//! This module contains the orchestration logic: the chat engine, the
//! SQLite conversation store, reply formatting and the single-turn widget.

mod chat;
mod format;
mod memory;
pub mod widget;

pub use chat::{build_context, ChatEngine, ChatError, ChatRequest, ChatResponse};
pub use format::format_response;
pub use memory::MemoryStore;

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::providers::{ProviderError, ResponseGenerator};

    /// Replies with a fixed string and remembers every context it was given
    pub struct RecordingGenerator {
        reply: String,
        contexts: Mutex<Vec<String>>,
    }

    impl RecordingGenerator {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                contexts: Mutex::new(Vec::new()),
            }
        }

        pub fn contexts(&self) -> Vec<String> {
            self.contexts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResponseGenerator for RecordingGenerator {
        async fn generate(&self, context: &str) -> Result<String, ProviderError> {
            self.contexts.lock().unwrap().push(context.to_string());
            Ok(self.reply.clone())
        }
    }

    pub struct FailingGenerator;

    #[async_trait]
    impl ResponseGenerator for FailingGenerator {
        async fn generate(&self, _context: &str) -> Result<String, ProviderError> {
            Err(ProviderError::InvalidResponse("model offline".to_string()))
        }
    }
}
