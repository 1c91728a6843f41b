//! Single-turn chat widget
//!
//! Forwards user input straight to the response generator. No history, no
//! persistence and no formatting.

use crate::providers::{ProviderError, ResponseGenerator};

/// Reply given when the user submits nothing
pub const EMPTY_INPUT_PROMPT: &str = "Please ask a question.";

pub async fn reply(generator: &dyn ResponseGenerator, input: &str) -> Result<String, ProviderError> {
    if input.trim().is_empty() {
        return Ok(EMPTY_INPUT_PROMPT.to_string());
    }
    generator.generate(input).await
}
