use super::ChatService;
use crate::models::ChatMessage;
use crate::prompt::PromptBuilder;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub struct MockGeminiClient {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<(i32, String)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockGeminiClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Make every call fail as if the CLI exited with `code`.
    pub fn with_failure(self, code: i32, stderr: String) -> Self {
        *self.failure.lock().unwrap() = Some((code, stderr));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Prompts received so far, rendered the same way the real CLI sees them.
    ///
    /// Inline images are written to a per-call temp directory that is removed
    /// before `generate` returns, so `@path` references in these prompts point
    /// at files that no longer exist.
    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn render(messages: &[ChatMessage]) -> Result<String> {
        let dir = tempfile::TempDir::new()?;
        let built = PromptBuilder::new(dir.path()).build(messages)?;
        Ok(built.prompt)
    }
}

impl Default for MockGeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockGeminiClient {
    async fn generate(&self, messages: &[ChatMessage], model: &str) -> Result<String> {
        let prompt = Self::render(messages)?;

        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        self.prompts.lock().unwrap().push(prompt.clone());

        if let Some((code, stderr)) = self.failure.lock().unwrap().clone() {
            return Err(Error::Execution { code, stderr });
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            Ok(format!("[{}] {}", model, prompt))
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}
