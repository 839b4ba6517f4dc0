//! Client for the Gemini command-line tool
//!
//! Turns chat-style messages into a single prompt, runs `gemini -m <model>
//! -p <prompt>` with a timeout, and returns the trimmed answer. Inline
//! base64 images are written to a temp directory for the CLI to read and
//! removed after each call.

pub mod ai;
pub mod error;
pub mod mime;
pub mod models;
pub mod prompt;

pub use ai::{ChatService, GeminiClient, MockGeminiClient};
pub use error::{Error, Result};
pub use models::{ChatContentPart, ChatMessage, ChatRole, ClientConfig, MessageContent};
