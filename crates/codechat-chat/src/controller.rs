//! Chat controller: the single place where session and transcript change.
//!
//! Every user action and every background completion arrives as a
//! [`UiEvent`]. Handling an event mutates state synchronously and returns the
//! [`Effect`]s the caller has to perform. Nothing here touches the network,
//! so transitions can be driven directly in tests.

use codechat_core::config::{ChatConfig, CodechatConfig};
use codechat_core::types::{Attachment, EntryId, EntryStatus, Role, TranscriptEntry, View};

use crate::client::AskRequest;
use crate::error::ChatError;
use crate::event::{Effect, OutboundRequest, UiEvent};
use crate::exchange::{Exchange, ExchangeState};
use crate::session::Session;
use crate::transcript::Transcript;
use crate::voice::{RecognitionSettings, SpeechError};

pub const EMPTY_NAME_ALERT: &str = "Please enter your name!";
pub const MISSING_ATTACHMENT_ALERT: &str = "Please select a file before asking a question.";
pub const VOICE_UNSUPPORTED_ALERT: &str = "Voice input is not supported on this system.";
pub const NO_SPEECH_ALERT: &str = "🎤 No speech detected! Please speak clearly into the mic.";

pub struct ChatController {
    config: ChatConfig,
    voice_settings: RecognitionSettings,
    voice_available: bool,
    view: View,
    session: Session,
    transcript: Transcript,
    exchanges: Vec<Exchange>,
    draft: String,
    last_error: Option<ChatError>,
}

impl ChatController {
    /// Create a controller on the welcome view.
    ///
    /// `voice_available` is the result of probing the speech recognizer.
    pub fn new(config: &CodechatConfig, voice_available: bool) -> Self {
        Self {
            config: config.chat.clone(),
            voice_settings: RecognitionSettings::from(&config.voice),
            voice_available,
            view: View::Welcome,
            session: Session::new(),
            transcript: Transcript::new(),
            exchanges: Vec::new(),
            draft: String::new(),
            last_error: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Current content of the input field.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// The most recent error an event produced, validation included.
    ///
    /// Diagnostic only: a rejected event leaves view, session, transcript,
    /// exchanges and draft exactly as they were.
    pub fn last_error(&self) -> Option<&ChatError> {
        self.last_error.as_ref()
    }

    pub fn chat_config(&self) -> &ChatConfig {
        &self.config
    }

    /// Text of `entry` as shown to the user.
    pub fn display_text(&self, entry: &TranscriptEntry) -> String {
        entry.display_text(&self.config.bot_marker)
    }

    /// Apply one event and return the effects it produced.
    pub fn dispatch(&mut self, event: UiEvent) -> Vec<Effect> {
        match event {
            UiEvent::NameConfirmed(raw) => self.handle_name(&raw),
            UiEvent::InputChanged(text) => {
                self.draft = text;
                Vec::new()
            }
            UiEvent::AttachmentSelected(attachment) => self.handle_attachment(attachment),
            UiEvent::MessageSubmitted(raw) => self.handle_submit(&raw),
            UiEvent::VoiceRequested => self.handle_voice_request(),
            UiEvent::VoiceRecognized(text) => {
                self.draft = text.clone();
                let mut effects = vec![Effect::SetInput(text.clone())];
                effects.extend(self.handle_submit(&text));
                effects
            }
            UiEvent::VoiceFailed(err) => self.handle_voice_failure(err),
            UiEvent::AnswerReceived { bot_entry, outcome } => self.handle_answer(bot_entry, outcome),
        }
    }

    pub fn confirm_name(&mut self, raw_input: &str) -> Vec<Effect> {
        self.dispatch(UiEvent::NameConfirmed(raw_input.to_string()))
    }

    pub fn select_attachment(&mut self, attachment: Attachment) -> Vec<Effect> {
        self.dispatch(UiEvent::AttachmentSelected(attachment))
    }

    pub fn submit_message(&mut self, text: &str) -> Vec<Effect> {
        self.dispatch(UiEvent::MessageSubmitted(text.to_string()))
    }

    pub fn start_voice_capture(&mut self) -> Vec<Effect> {
        self.dispatch(UiEvent::VoiceRequested)
    }

    fn handle_name(&mut self, raw: &str) -> Vec<Effect> {
        if self.view == View::Chat {
            tracing::debug!("Name confirmation ignored, chat view already open");
            return Vec::new();
        }

        let name = raw.trim();
        if name.is_empty() {
            self.last_error = Some(ChatError::EmptyName);
            return vec![Effect::Alert(EMPTY_NAME_ALERT.to_string())];
        }

        self.session.set_user_name(name.to_string());
        self.view = View::Chat;
        tracing::info!(user_name = %name, "Chat view opened");
        vec![Effect::ShowChat {
            user_name: name.to_string(),
        }]
    }

    fn handle_attachment(&mut self, attachment: Attachment) -> Vec<Effect> {
        let effects = vec![
            Effect::Notice(attachment.label()),
            Effect::Alert(attachment.ready_notice()),
        ];
        tracing::info!(file_name = %attachment.file_name, "Attachment selected");
        if let Some(previous) = self.session.select_attachment(attachment) {
            tracing::debug!(file_name = %previous.file_name, "Previous attachment replaced");
        }
        effects
    }

    fn handle_submit(&mut self, raw: &str) -> Vec<Effect> {
        if self.view != View::Chat {
            tracing::debug!("Message ignored, chat view not open");
            return Vec::new();
        }

        let question = raw.trim();
        if question.is_empty() {
            self.last_error = Some(ChatError::EmptyMessage);
            return Vec::new();
        }

        if self.config.require_attachment && self.session.pending_attachment().is_none() {
            self.last_error = Some(ChatError::MissingAttachment);
            return vec![Effect::Alert(MISSING_ATTACHMENT_ALERT.to_string())];
        }

        let attachment = self
            .session
            .attachment_for_send(self.config.attachment_policy);
        let user_entry =
            self.transcript
                .append(Role::User, question.to_string(), EntryStatus::Final);
        let bot_entry = self.transcript.append(
            Role::Bot,
            self.config.pending_text.clone(),
            EntryStatus::Pending,
        );

        let mut exchange = Exchange::new(user_entry, bot_entry, attachment.is_some());
        exchange.advance(ExchangeState::Submitted);
        tracing::info!(
            exchange_id = %exchange.id,
            bot_entry = %bot_entry,
            with_attachment = exchange.with_attachment,
            "Question submitted"
        );
        self.exchanges.push(exchange);
        self.draft.clear();

        vec![
            Effect::EntryAppended(user_entry),
            Effect::EntryAppended(bot_entry),
            Effect::ClearInput,
            Effect::Send(OutboundRequest {
                bot_entry,
                request: AskRequest::new(question.to_string(), attachment),
            }),
        ]
    }

    fn handle_answer(
        &mut self,
        bot_entry: EntryId,
        outcome: Result<String, ChatError>,
    ) -> Vec<Effect> {
        let Some(exchange) = self
            .exchanges
            .iter_mut()
            .find(|e| e.bot_entry == bot_entry)
        else {
            tracing::warn!(bot_entry = %bot_entry, "Answer for unknown entry dropped");
            return Vec::new();
        };
        if exchange.state().is_terminal() {
            tracing::warn!(bot_entry = %bot_entry, state = %exchange.state(), "Answer for settled entry dropped");
            return Vec::new();
        }

        let (text, target) = match outcome {
            Ok(answer) => {
                tracing::info!(exchange_id = %exchange.id, answer_len = answer.len(), "Answer received");
                (answer, ExchangeState::Resolved)
            }
            Err(err) => {
                tracing::error!(exchange_id = %exchange.id, error = %err, "Error fetching answer");
                self.last_error = Some(err);
                (self.config.error_text.clone(), ExchangeState::Failed)
            }
        };
        exchange.advance(target);
        self.transcript.resolve(bot_entry, text);
        vec![Effect::EntryUpdated(bot_entry)]
    }

    fn handle_voice_request(&mut self) -> Vec<Effect> {
        if self.view != View::Chat {
            tracing::debug!("Voice request ignored, chat view not open");
            return Vec::new();
        }
        if !self.voice_available {
            self.last_error = Some(ChatError::CapabilityUnavailable);
            return vec![Effect::Alert(VOICE_UNSUPPORTED_ALERT.to_string())];
        }
        vec![Effect::StartVoice(self.voice_settings.clone())]
    }

    fn handle_voice_failure(&mut self, err: SpeechError) -> Vec<Effect> {
        tracing::warn!(error = %err, "Voice capture failed");
        let alert = match &err {
            SpeechError::NoSpeech => NO_SPEECH_ALERT.to_string(),
            SpeechError::Other(code) => format!("Voice error: {}", code),
        };
        self.last_error = Some(ChatError::Voice(err.to_string()));
        vec![Effect::Alert(alert)]
    }
}

// =============================================================================
// Tests
// =============================================================================
