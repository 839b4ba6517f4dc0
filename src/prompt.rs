//! Prompt serialization
//!
//! Flattens a conversation into the single `-p` argument the Gemini CLI
//! takes, writing inline `data:` images to files the CLI can reference with
//! `@path`.

use crate::mime::image_extension;
use crate::models::{ChatContentPart, ChatMessage, MessageContent};
use crate::{Error, Result};
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Temp files created for one generation call, removed on drop.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Delete every tracked file that still exists. Failures are logged.
    pub fn cleanup(&mut self) {
        for path in self.paths.drain(..) {
            if !path.exists() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!("Removed temp file {}", path.display()),
                Err(e) => tracing::warn!("Failed to remove temp file {}: {}", path.display(), e),
            }
        }
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Standard alphabet that tolerates non-zero trailing bits in the last symbol.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

pub struct BuiltPrompt {
    pub prompt: String,
    pub temp_files: TempFiles,
}

pub struct PromptBuilder {
    temp_dir: PathBuf,
}

impl PromptBuilder {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Render one `"{role}: {text}"` line per message.
    ///
    /// On error, images already written by this call are removed when the
    /// partially filled [`TempFiles`] is dropped.
    pub fn build(&self, messages: &[ChatMessage]) -> Result<BuiltPrompt> {
        let mut temp_files = TempFiles::new();
        let mut lines = Vec::with_capacity(messages.len());

        for message in messages {
            let text = match &message.content {
                MessageContent::Text(text) => text.clone(),
                MessageContent::Parts(parts) => self.render_parts(parts, &mut temp_files)?,
            };
            lines.push(format!("{}: {}", message.role, text));
        }

        Ok(BuiltPrompt {
            prompt: lines.join("\n"),
            temp_files,
        })
    }

    fn render_parts(
        &self,
        parts: &[ChatContentPart],
        temp_files: &mut TempFiles,
    ) -> Result<String> {
        let mut text = String::new();
        for part in parts {
            match part {
                ChatContentPart::Text { text: segment } => {
                    text.push_str(segment.as_deref().unwrap_or(""));
                }
                ChatContentPart::ImageUrl { image_url } => {
                    let url = &image_url.url;
                    if url.starts_with("data:") {
                        let path = self.save_data_uri(url)?;
                        text.push_str(&format!(" @{}", path.display()));
                        temp_files.push(path);
                    } else {
                        text.push_str(&format!(" <image>{}</image>", url));
                    }
                }
            }
        }
        Ok(text)
    }

    fn save_data_uri(&self, data_uri: &str) -> Result<PathBuf> {
        let (header, payload) = data_uri.split_once(',').ok_or_else(|| {
            Error::MalformedDataUri(format!(
                "missing ',' separator in {}",
                truncate(data_uri, 64)
            ))
        })?;

        // Payloads may be line-wrapped.
        let payload: Vec<u8> = payload
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let bytes = LENIENT_BASE64.decode(payload)?;

        let id = Uuid::new_v4().simple().to_string();
        let filename = format!("{}{}", &id[..8], image_extension(header));

        fs::create_dir_all(&self.temp_dir)?;
        let path = self.temp_dir.join(filename);
        fs::write(&path, bytes)?;
        tracing::debug!("Saved inline image to {}", path.display());

        Ok(path)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
