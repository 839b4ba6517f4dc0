//! Text generation through the Gemini CLI
//!
//! [`GeminiClient`] shells out to the `gemini` command for each request;
//! [`MockGeminiClient`] returns canned answers for tests and harnesses.

pub mod client;
pub mod mock;

#[cfg(all(test, unix))]
pub(crate) mod test_support;

pub use client::GeminiClient;
pub use mock::MockGeminiClient;

use crate::models::ChatMessage;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatService: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage], model: &str) -> Result<String>;
}
