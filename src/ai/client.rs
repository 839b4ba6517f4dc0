use super::ChatService;
use crate::models::{ChatMessage, ClientConfig, DEFAULT_COMMAND, DEFAULT_TEMP_DIR, DEFAULT_TIMEOUT};
use crate::prompt::{BuiltPrompt, PromptBuilder};
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs `<command> -m <model> -p <prompt>` once per request.
pub struct GeminiClient {
    command: String,
    timeout: Duration,
    prompt_builder: PromptBuilder,
}

impl GeminiClient {
    /// Construct a client for the given executable.
    ///
    /// `command` is resolved through `PATH` unless it is a path. On Windows
    /// the npm shim has to be named explicitly (for example `gemini.cmd`).
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
            prompt_builder: PromptBuilder::new(DEFAULT_TEMP_DIR),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.command.clone(), config.timeout).with_temp_dir(config.temp_dir.clone())
    }

    /// Directory where inline images are written for the CLI to read.
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.prompt_builder = PromptBuilder::new(temp_dir);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Generate a response for `messages` with `model`.
    ///
    /// Temp images written for the prompt are removed before this returns,
    /// whatever the outcome, and also if the future is dropped early.
    pub async fn generate(&self, messages: &[ChatMessage], model: &str) -> Result<String> {
        let BuiltPrompt { prompt, temp_files } = self.prompt_builder.build(messages)?;

        let result = self.call_gemini(&prompt, model).await;
        drop(temp_files);

        result
    }

    async fn call_gemini(&self, prompt: &str, model: &str) -> Result<String> {
        tracing::debug!(
            "exec: {} -m {} -p <{} chars>",
            self.command,
            model,
            prompt.chars().count()
        );

        let mut cmd = Command::new(&self.command);
        cmd.arg("-m")
            .arg(model)
            .arg("-p")
            .arg(prompt)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                tracing::warn!(
                    "Gemini CLI did not finish within {:?}, killing it",
                    self.timeout
                );
                Error::Timeout(self.timeout)
            })?
            .map_err(|e| {
                tracing::error!("Failed to start {}: {}", self.command, e);
                Error::Spawn(e)
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!("Gemini CLI exited with {}: {}", code, stderr);
            return Err(Error::Execution { code, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND, DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl ChatService for GeminiClient {
    async fn generate(&self, messages: &[ChatMessage], model: &str) -> Result<String> {
        GeminiClient::generate(self, messages, model).await
    }
}
