//! Chat controller for codechat.
//!
//! Holds the session and the append-only transcript, turns typed UI events
//! into effects, and runs outbound questions and voice capture as background
//! tasks whose results are fed back as events.

pub mod client;
pub mod controller;
pub mod error;
pub mod event;
pub mod exchange;
pub mod runtime;
pub mod session;
pub mod transcript;
pub mod voice;

pub use client::{AskClient, AskRequest, HttpAskClient};
pub use controller::ChatController;
pub use error::{ChatError, ErrorKind};
pub use event::{Effect, OutboundRequest, UiEvent};
pub use exchange::{Exchange, ExchangeState};
pub use runtime::ChatRuntime;
pub use session::Session;
pub use transcript::Transcript;
pub use voice::{CommandRecognizer, RecognitionSettings, SpeechError, SpeechRecognizer};
