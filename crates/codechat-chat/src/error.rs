//! Error types for the chat controller.

use codechat_core::error::CodechatError;

/// Broad class of a [`ChatError`], deciding how it is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input. Alerted, nothing is mutated.
    Validation,
    /// Request failed. Logged, fixed text shown in the transcript.
    Transport,
    /// Platform feature missing or failing. Alerted.
    Capability,
}

/// Errors from the chat controller and its background tasks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("an attachment is required before sending a question")]
    MissingAttachment,
    #[error("server responded with HTTP status {0}")]
    HttpStatus(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("attachment error: {0}")]
    Attachment(String),
    #[error("speech recognition is not available")]
    CapabilityUnavailable,
    #[error("voice error: {0}")]
    Voice(String),
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::EmptyName | ChatError::EmptyMessage | ChatError::MissingAttachment => {
                ErrorKind::Validation
            }
            ChatError::HttpStatus(_)
            | ChatError::Transport(_)
            | ChatError::InvalidResponse(_)
            | ChatError::Attachment(_) => ErrorKind::Transport,
            ChatError::CapabilityUnavailable | ChatError::Voice(_) => ErrorKind::Capability,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ChatError::HttpStatus(status.as_u16())
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}

impl From<ChatError> for CodechatError {
    fn from(err: ChatError) -> Self {
        CodechatError::Http(err.to_string())
    }
}
