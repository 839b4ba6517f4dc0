//! Data models and structures
//!
//! Defines chat messages and their content parts as accepted by
//! [`GeminiClient::generate`](crate::GeminiClient::generate), plus the
//! environment-driven client configuration.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_COMMAND: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_TEMP_DIR: &str = ".gemini_tmp";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageUrl {
    /// Either a `data:<mime>;base64,<payload>` URI or an external URL.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// One segment of a multi-part message, discriminated by its `type` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatContentPart {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    ImageUrl {
        image_url: ImageUrl,
    },
}

impl ChatContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ChatContentPart::Text {
            text: Some(text.into()),
        }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ChatContentPart::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: None,
            },
        }
    }

    /// Embed raw image bytes as a base64 `data:` URI.
    pub fn data_uri(mime_type: &str, bytes: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self::image_url(format!("data:{};base64,{}", mime_type, encoded))
    }
}

/// Message body: either a plain string or an ordered list of parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn with_parts(role: ChatRole, parts: Vec<ChatContentPart>) -> Self {
        Self {
            role,
            content: MessageContent::Parts(parts),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

// Configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub command: String,
    pub timeout: Duration,
    pub temp_dir: PathBuf,
    pub model: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load `.env` (if present) and read `GEMINI_*` variables.
    pub fn from_env() -> crate::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }

        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout = match lookup("GEMINI_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: f64 = raw.trim().parse().map_err(|_| {
                    crate::Error::Config(format!("GEMINI_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                Duration::try_from_secs_f64(secs).map_err(|_| {
                    crate::Error::Config(format!("GEMINI_TIMEOUT_SECS out of range: {}", raw))
                })?
            }
            None => defaults.timeout,
        };

        Ok(Self {
            command: lookup("GEMINI_CMD").unwrap_or(defaults.command),
            timeout,
            temp_dir: lookup("GEMINI_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
            model: lookup("GEMINI_MODEL").unwrap_or(defaults.model),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_plain_string_content_deserializes() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role": "user", "content": "Hello World!"}"#).unwrap();
        assert_eq!(msg, ChatMessage::user("Hello World!"));
    }

    #[test]
    fn test_parts_content_deserializes() {
        let msg: ChatMessage = serde_json::from_str(
            r#"{
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "look"},
                    {"type": "text"},
                    {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(msg.role, ChatRole::Assistant);
        assert_eq!(
            msg.content,
            MessageContent::Parts(vec![
                ChatContentPart::text("look"),
                ChatContentPart::Text { text: None },
                ChatContentPart::image_url("https://example.com/a.png"),
            ])
        );
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result: std::result::Result<ChatMessage, _> =
            serde_json::from_str(r#"{"role": "tool", "content": "hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_part_serializes_with_type_tag() {
        let json = serde_json::to_value(ChatContentPart::image_url("https://x/y.jpg")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "image_url", "image_url": {"url": "https://x/y.jpg"}})
        );
    }

    #[test]
    fn test_data_uri_constructor() {
        let part = ChatContentPart::data_uri("image/png", &[0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(part, ChatContentPart::image_url("data:image/png;base64,iVBORw=="));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(ChatRole::System.to_string(), "system");
        assert_eq!(ChatRole::User.to_string(), "user");
        assert_eq!(ChatRole::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_config_defaults_when_unset() {
        let config = ClientConfig::from_vars(|_| None).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.command, "gemini");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.temp_dir, PathBuf::from(".gemini_tmp"));
        assert_eq!(config.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_config_reads_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GEMINI_CMD", "/opt/bin/gemini"),
            ("GEMINI_TIMEOUT_SECS", "2.5"),
            ("GEMINI_TMP_DIR", "/tmp/gem"),
            ("GEMINI_MODEL", "gemini-2.5-flash"),
        ]);

        let config = ClientConfig::from_vars(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.command, "/opt/bin/gemini");
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.temp_dir, PathBuf::from("/tmp/gem"));
        assert_eq!(config.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        let err = ClientConfig::from_vars(|k| {
            (k == "GEMINI_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));

        let err = ClientConfig::from_vars(|k| {
            (k == "GEMINI_TIMEOUT_SECS").then(|| "-1".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
