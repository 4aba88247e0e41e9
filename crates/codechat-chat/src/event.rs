//! Events fed into the controller and effects it asks the outside to perform.

use codechat_core::types::{Attachment, EntryId};

use crate::client::AskRequest;
use crate::error::ChatError;
use crate::voice::{RecognitionSettings, SpeechError};

/// Everything that can happen to the chat client.
#[derive(Debug)]
pub enum UiEvent {
    /// The name field was confirmed with this raw input.
    NameConfirmed(String),
    /// The input field changed.
    InputChanged(String),
    /// A file was picked.
    AttachmentSelected(Attachment),
    /// A message was submitted with this raw text.
    MessageSubmitted(String),
    /// The voice button was pressed.
    VoiceRequested,
    /// Recognition finished with this top hypothesis.
    VoiceRecognized(String),
    VoiceFailed(SpeechError),
    /// The request answering `bot_entry` completed.
    AnswerReceived {
        bot_entry: EntryId,
        outcome: Result<String, ChatError>,
    },
}

/// A question to send on behalf of a pending bot entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub bot_entry: EntryId,
    pub request: AskRequest,
}

/// Work the controller requests after handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hide the welcome step and show the chat view.
    ShowChat { user_name: String },
    /// Blocking message for the user.
    Alert(String),
    /// Non-blocking status text, e.g. the selected file label.
    Notice(String),
    EntryAppended(EntryId),
    EntryUpdated(EntryId),
    ClearInput,
    SetInput(String),
    Send(OutboundRequest),
    StartVoice(RecognitionSettings),
}

impl Effect {
    /// Whether the effect is performed by the runtime rather than the front end.
    pub fn is_background(&self) -> bool {
        matches!(self, Effect::Send(_) | Effect::StartVoice(_))
    }
}
