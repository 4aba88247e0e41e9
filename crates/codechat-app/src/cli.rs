//! CLI argument definitions for the codechat binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// codechat: ask a local code question-answering backend from the terminal.
#[derive(Parser, Debug)]
#[command(name = "codechat", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8000.
    #[arg(short = 's', long = "server")]
    pub server: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Skip the name prompt.
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// File to attach before the first question.
    #[arg(short = 'a', long = "attach")]
    pub attach: Option<PathBuf>,

    /// Ask a single question, print the answer and exit.
    #[arg(short = 'q', long = "ask")]
    pub ask: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CODECHAT_CONFIG env var > ~/.codechat/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CODECHAT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend base URL.
    ///
    /// Priority: --server flag > CODECHAT_SERVER env var > config file value.
    pub fn resolve_server(&self, config_base_url: &str) -> String {
        if let Some(ref s) = self.server {
            return s.clone();
        }
        if let Ok(s) = std::env::var("CODECHAT_SERVER") {
            if !s.trim().is_empty() {
                return s;
            }
        }
        config_base_url.to_string()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".codechat").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".codechat").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let args = CliArgs::try_parse_from([
            "codechat",
            "--config",
            "/tmp/codechat.toml",
            "--server",
            "http://127.0.0.1:9000",
            "--log-level",
            "debug",
            "--name",
            "Ada",
            "--attach",
            "src/main.c",
            "--ask",
            "what is main?",
        ])
        .unwrap();
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/codechat.toml"));
        assert_eq!(
            args.resolve_server("http://localhost:8000"),
            "http://127.0.0.1:9000"
        );
        assert_eq!(args.resolve_log_level("info"), "debug");
        assert_eq!(args.name.as_deref(), Some("Ada"));
        assert_eq!(args.attach, Some(PathBuf::from("src/main.c")));
        assert_eq!(args.ask.as_deref(), Some("what is main?"));
    }

    #[test]
    fn test_log_level_falls_back_to_config() {
        let args = CliArgs::try_parse_from(["codechat"]).unwrap();
        assert_eq!(args.resolve_log_level("warn"), "warn");
        assert!(args.name.is_none());
        assert!(args.ask.is_none());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(CliArgs::try_parse_from(["codechat", "--port", "1"]).is_err());
    }
}
