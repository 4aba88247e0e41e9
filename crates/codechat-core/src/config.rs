use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CodechatError, Result};

/// Top-level configuration for the codechat client.
///
/// Loaded from `~/.codechat/config.toml` by default. Every section falls back
/// to its defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodechatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl CodechatConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodechatConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(CodechatError::Config(
                "server.base_url must not be empty".to_string(),
            ));
        }
        for (key, path) in [
            ("server.ask_path", &self.server.ask_path),
            ("server.ask_text_path", &self.server.ask_text_path),
        ] {
            if !path.starts_with('/') {
                return Err(CodechatError::Config(format!(
                    "{} must start with '/', got {:?}",
                    key, path
                )));
            }
        }
        if self.voice.max_alternatives == 0 {
            return Err(CodechatError::Config(
                "voice.max_alternatives must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// JSON body shape used when a question is sent without an attachment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// `POST <ask_text_path>` with `{"prompt": ...}`.
    #[default]
    Prompt,
    /// `POST <ask_path>` with `{"question": ...}`.
    Question,
}

/// Backend endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Scheme, host and port of the question-answering backend.
    pub base_url: String,
    /// Endpoint for multipart questions (and JSON questions in `question` mode).
    pub ask_path: String,
    /// Endpoint for JSON questions in `prompt` mode.
    pub ask_text_path: String,
    /// Body shape for questions without an attachment.
    pub text_encoding: TextEncoding,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            ask_path: "/ask".to_string(),
            ask_text_path: "/ask_text".to_string(),
            text_encoding: TextEncoding::Prompt,
        }
    }
}

impl ServerConfig {
    /// Join the base URL and an endpoint path without doubling the slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// What happens to the pending attachment after a question is sent with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentPolicy {
    /// Keep sending the same file with every question until another is picked.
    #[default]
    Persist,
    /// Drop the attachment once it has been sent.
    ClearAfterSend,
}

/// Chat behaviour and the fixed texts shown in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Refuse to send questions until a file has been attached.
    pub require_attachment: bool,
    pub attachment_policy: AttachmentPolicy,
    /// Marker prefixed to every bot entry when displayed.
    pub bot_marker: String,
    /// Placeholder text of a pending bot entry.
    pub pending_text: String,
    /// Text a bot entry takes when its request fails.
    pub error_text: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            require_attachment: false,
            attachment_policy: AttachmentPolicy::Persist,
            bot_marker: "🤖".to_string(),
            pending_text: "Thinking...".to_string(),
            error_text: "Sorry, something went wrong. Please check the console.".to_string(),
        }
    }
}

/// Speech input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// BCP 47 language tag handed to the recognizer.
    pub language: String,
    pub max_alternatives: u32,
    pub interim_results: bool,
    /// External speech-to-text command (program followed by arguments).
    /// Empty disables voice input.
    pub command: Vec<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            max_alternatives: 1,
            interim_results: false,
            command: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = CodechatConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.server.ask_path, "/ask");
        assert_eq!(config.server.ask_text_path, "/ask_text");
        assert_eq!(config.server.text_encoding, TextEncoding::Prompt);
        assert!(!config.chat.require_attachment);
        assert_eq!(config.chat.attachment_policy, AttachmentPolicy::Persist);
        assert_eq!(config.chat.bot_marker, "🤖");
        assert_eq!(config.chat.pending_text, "Thinking...");
        assert_eq!(config.voice.language, "en-US");
        assert_eq!(config.voice.max_alternatives, 1);
        assert!(!config.voice.interim_results);
        assert!(config.voice.command.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[server]
base_url = "http://127.0.0.1:9000/"
text_encoding = "question"

[chat]
require_attachment = true
attachment_policy = "clear_after_send"

[voice]
language = "en-GB"
command = ["whisper-listen", "--once"]
"#;
        let file = create_temp_config(content);
        let config = CodechatConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.text_encoding, TextEncoding::Question);
        assert!(config.chat.require_attachment);
        assert_eq!(
            config.chat.attachment_policy,
            AttachmentPolicy::ClearAfterSend
        );
        assert_eq!(config.voice.language, "en-GB");
        assert_eq!(config.voice.command, vec!["whisper-listen", "--once"]);
        // Untouched fields keep their defaults
        assert_eq!(config.server.ask_path, "/ask");
        assert_eq!(config.chat.pending_text, "Thinking...");
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let file = create_temp_config("");
        let config = CodechatConfig::load(file.path()).unwrap();
        assert_eq!(config.server.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_load_rejects_unknown_encoding() {
        let file = create_temp_config("[server]\ntext_encoding = \"xml\"\n");
        let err = CodechatConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, CodechatError::Config(_)));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = create_temp_config("[server]\nask_path = \"ask\"\n");
        let err = CodechatConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("server.ask_path"));

        let file = create_temp_config("[voice]\nmax_alternatives = 0\n");
        assert!(CodechatConfig::load(file.path()).is_err());

        let file = create_temp_config("[server]\nbase_url = \"  \"\n");
        assert!(CodechatConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = CodechatConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.server.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CodechatConfig::default();
        config.server.text_encoding = TextEncoding::Question;
        config.chat.error_text = "backend unreachable".to_string();
        config.save(&path).unwrap();

        let reloaded = CodechatConfig::load(&path).unwrap();
        assert_eq!(reloaded.server.text_encoding, TextEncoding::Question);
        assert_eq!(reloaded.chat.error_text, "backend unreachable");
        assert_eq!(reloaded.chat.bot_marker, config.chat.bot_marker);
    }

    #[test]
    fn test_endpoint_join() {
        let mut server = ServerConfig::default();
        assert_eq!(server.endpoint("/ask"), "http://localhost:8000/ask");

        server.base_url = "http://localhost:8000/".to_string();
        assert_eq!(server.endpoint("/ask_text"), "http://localhost:8000/ask_text");
    }
}
