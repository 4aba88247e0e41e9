//! Speech input for the chat controller.
//!
//! A recognizer runs one single-shot, final-results-only recognition and
//! returns its hypotheses best first. The controller writes the top one into
//! the input field and submits it.

use std::process::Stdio;

use async_trait::async_trait;

use codechat_core::config::VoiceConfig;

/// Parameters of a single recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    /// BCP 47 language tag.
    pub language: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

impl From<&VoiceConfig> for RecognitionSettings {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            language: config.language.clone(),
            interim_results: config.interim_results,
            max_alternatives: config.max_alternatives.max(1),
        }
    }
}

/// Failure reported by a recognition session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    /// The session ended without hearing anything.
    #[error("no-speech")]
    NoSpeech,
    /// Any other failure, carrying a short error code or message.
    #[error("{0}")]
    Other(String),
}

/// A speech-to-text backend.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Whether the platform can run recognition at all.
    fn is_available(&self) -> bool;

    /// Run one recognition session. Hypotheses are ordered best first and
    /// never empty on success.
    async fn recognize(&self, settings: &RecognitionSettings) -> Result<Vec<String>, SpeechError>;
}

/// Recognizer backed by an external speech-to-text program.
///
/// The program is started once per session with `CODECHAT_VOICE_LANGUAGE`
/// and `CODECHAT_VOICE_MAX_ALTERNATIVES` in its environment. Every non-empty
/// stdout line is a hypothesis, best first. A program that prints nothing
/// heard no speech.
#[derive(Debug, Clone, Default)]
pub struct CommandRecognizer {
    command: Vec<String>,
}

impl CommandRecognizer {
    /// `command` is the program followed by its arguments. Empty means voice
    /// input is unavailable.
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    fn is_available(&self) -> bool {
        !self.command.is_empty()
    }

    async fn recognize(&self, settings: &RecognitionSettings) -> Result<Vec<String>, SpeechError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| SpeechError::Other("not-allowed".to_string()))?;

        tracing::debug!(program = %program, language = %settings.language, "Starting speech recognizer");

        let output = tokio::process::Command::new(program)
            .args(args)
            .env("CODECHAT_VOICE_LANGUAGE", &settings.language)
            .env(
                "CODECHAT_VOICE_MAX_ALTERNATIVES",
                settings.max_alternatives.to_string(),
            )
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SpeechError::Other(format!("audio-capture: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(SpeechError::Other(detail));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let hypotheses: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(settings.max_alternatives as usize)
            .map(str::to_string)
            .collect();

        if hypotheses.is_empty() {
            return Err(SpeechError::NoSpeech);
        }
        Ok(hypotheses)
    }
}
