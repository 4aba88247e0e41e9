use thiserror::Error;

/// Top-level error type for codechat.
///
/// Subsystem crates define their own error types and convert into this one
/// where a failure has to cross a crate boundary (configuration loading,
/// startup in the binary).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodechatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

impl From<toml::de::Error> for CodechatError {
    fn from(err: toml::de::Error) -> Self {
        CodechatError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CodechatError {
    fn from(err: toml::ser::Error) -> Self {
        CodechatError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CodechatError {
    fn from(err: serde_json::Error) -> Self {
        CodechatError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for codechat operations.
pub type Result<T> = std::result::Result<T, CodechatError>;
