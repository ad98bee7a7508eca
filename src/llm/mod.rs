//! Text generation client and helpers for reading its output.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::error::Result;

/// Returned by generators when the service answered without any candidate text.
pub const NO_RESPONSE: &str = "No response generated.";

/// Black-box "generate text from a prompt" service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// Errors on transport failure, non-success status or missing credential.
    /// Returns [`NO_RESPONSE`] when the response carries no candidate.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Content of the first triple-backtick fenced block, trimmed, with a leading
/// language `tag` removed. `None` when the text has no fence at all.
///
/// An unterminated fence yields everything after the opening backticks.
pub fn fenced_block(text: &str, tag: &str) -> Option<String> {
    let mut parts = text.split("```");
    parts.next()?;
    let block = parts.next()?.trim();
    let block = match block.strip_prefix(tag) {
        Some(rest) if !tag.is_empty() => rest.trim(),
        _ => block,
    };
    Some(block.to_string())
}
