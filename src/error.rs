//! Error handling and custom error types
//!
//! Provides unified error handling across the client using thiserror.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed data URI: {0}")]
    MalformedDataUri(String),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to start Gemini CLI: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Gemini CLI timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Gemini CLI failed ({code}): {stderr}")]
    Execution { code: i32, stderr: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
