//! codechat binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Install the tracing subscriber (stderr, so the transcript stays clean)
//! 3. Build the HTTP ask client and the speech recognizer
//! 4. Run the name prompt, then either a one-shot question or the chat loop

mod cli;
mod terminal;

use std::io;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use codechat_chat::{
    ChatRuntime, CommandRecognizer, ExchangeState, HttpAskClient, SpeechRecognizer, UiEvent,
};
use codechat_core::config::{CodechatConfig, GeneralConfig};
use codechat_core::types::{Attachment, View};

use cli::CliArgs;
use terminal::{Command, TerminalFrontend};

type Input = Lines<BufReader<Stdin>>;

/// Read lines until a non-blank name is confirmed. `false` on end of input.
async fn name_phase(
    rt: &mut ChatRuntime,
    frontend: &mut TerminalFrontend<io::Stdout>,
    input: &mut Input,
    preset: Option<String>,
) -> io::Result<bool> {
    if let Some(name) = preset {
        let effects = rt.dispatch(UiEvent::NameConfirmed(name));
        frontend.render(rt.controller(), &effects)?;
    }
    while rt.controller().view() == View::Welcome {
        frontend.name_prompt()?;
        let Some(line) = input.next_line().await? else {
            return Ok(false);
        };
        let effects = rt.dispatch(UiEvent::NameConfirmed(line));
        frontend.render(rt.controller(), &effects)?;
    }
    Ok(true)
}

fn attach(
    rt: &mut ChatRuntime,
    frontend: &mut TerminalFrontend<io::Stdout>,
    path: &std::path::Path,
) -> io::Result<()> {
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "Attachment path is not a file");
        return frontend.line(&format!(
            "[!] No such file: {}",
            terminal::sanitize(&path.display().to_string())
        ));
    }
    let effects = rt.dispatch(UiEvent::AttachmentSelected(Attachment::from_path(path)));
    frontend.render(rt.controller(), &effects)
}

/// Start voice capture, announcing it only when a capture task was started.
fn request_voice<W: io::Write>(
    rt: &mut ChatRuntime,
    frontend: &mut TerminalFrontend<W>,
) -> io::Result<()> {
    let running = rt.in_flight();
    let effects = rt.dispatch(UiEvent::VoiceRequested);
    frontend.render(rt.controller(), &effects)?;
    if rt.in_flight() > running {
        frontend.line("Listening...")?;
    }
    Ok(())
}

/// Ask one question, wait for the answer and print it.
///
/// A rejected question or a failed exchange is returned as the error.
async fn one_shot<W: io::Write>(
    rt: &mut ChatRuntime,
    frontend: &mut TerminalFrontend<W>,
    question: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let sent_before = rt.controller().exchanges().len();
    let effects = rt.dispatch(UiEvent::MessageSubmitted(question));
    frontend.render(rt.controller(), &effects)?;

    if rt.controller().exchanges().len() == sent_before {
        return match rt.controller().last_error() {
            Some(err) => Err(Box::new(err.clone())),
            None => Err("Question was not sent".into()),
        };
    }

    let effects = rt.settle().await;
    frontend.render(rt.controller(), &effects)?;

    let Some(exchange) = rt.controller().exchanges().last() else {
        return Err("Question was not sent".into());
    };
    if exchange.state() == ExchangeState::Failed {
        if let Some(err) = rt.controller().last_error() {
            return Err(Box::new(err.clone()));
        }
    }
    Ok(())
}

/// Interactive loop: stdin lines and background completions, whichever comes first.
async fn chat_loop(
    rt: &mut ChatRuntime,
    frontend: &mut TerminalFrontend<io::Stdout>,
    input: &mut Input,
) -> io::Result<()> {
    frontend.chat_prompt(rt.controller())?;
    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match terminal::parse_command(&line) {
                    Command::Quit => break,
                    Command::Help => frontend.line(terminal::HELP)?,
                    Command::Usage(usage) => frontend.line(&format!("Usage: {}", usage))?,
                    Command::Attach(path) => attach(rt, frontend, &path)?,
                    Command::Voice => request_voice(rt, frontend)?,
                    Command::Ask(text) => {
                        let effects = rt.dispatch(UiEvent::MessageSubmitted(text));
                        frontend.render(rt.controller(), &effects)?;
                    }
                }
                frontend.chat_prompt(rt.controller())?;
            }
            Some(effects) = rt.next_completion(), if rt.in_flight() > 0 => {
                frontend.line("")?;
                frontend.render(rt.controller(), &effects)?;
                frontend.chat_prompt(rt.controller())?;
            }
            _ = tokio::signal::ctrl_c() => {
                frontend.line("")?;
                break;
            }
        }
    }

    if rt.in_flight() > 0 {
        tracing::info!(in_flight = rt.in_flight(), "Exiting with requests still pending");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config holds the log level, so it is read before tracing is up and
    // the outcome is logged afterwards.
    let config_file = args.resolve_config_path();
    let loaded = CodechatConfig::load(&config_file);
    let config_level = match &loaded {
        Ok(config) => config.general.log_level.clone(),
        Err(_) => GeneralConfig::default().log_level,
    };

    // Tracing. RUST_LOG wins over --log-level and the config file.
    let log_level = args.resolve_log_level(&config_level);
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    tracing::info!("Starting codechat v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match loaded {
        Ok(config) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Err(e) if !config_file.exists() => {
            tracing::debug!(path = %config_file.display(), error = %e, "No configuration file, using defaults");
            CodechatConfig::default()
        }
        Err(e) => {
            tracing::warn!(path = %config_file.display(), error = %e, "Failed to load configuration, using defaults");
            CodechatConfig::default()
        }
    };
    config.server.base_url = args.resolve_server(&config.server.base_url);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    let client = HttpAskClient::new(config.server.clone())?;
    let recognizer = CommandRecognizer::new(config.voice.command.clone());
    if !recognizer.is_available() {
        tracing::debug!("No voice command configured, voice input disabled");
    }
    tracing::info!(
        base_url = %config.server.base_url,
        encoding = ?config.server.text_encoding,
        "Backend configured"
    );

    let mut rt = ChatRuntime::new(&config, Arc::new(client), Arc::new(recognizer));
    let mut frontend = TerminalFrontend::new(io::stdout());
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if !name_phase(&mut rt, &mut frontend, &mut input, args.name.clone()).await? {
        return Ok(());
    }
    if let Some(path) = args.attach.as_deref() {
        attach(&mut rt, &mut frontend, path)?;
    }

    match args.ask {
        Some(question) => one_shot(&mut rt, &mut frontend, question).await,
        None => Ok(chat_loop(&mut rt, &mut frontend, &mut input).await?),
    }
}
