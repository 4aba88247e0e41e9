pub mod config;
pub mod error;
pub mod types;

pub use config::CodechatConfig;
pub use error::{CodechatError, Result};
pub use types::*;
