//! Async runtime around the controller.
//!
//! `Send` and `StartVoice` effects are run as tokio tasks in a [`JoinSet`].
//! Their results are dispatched on the caller's task, so the controller is
//! only ever touched from one place. Every task yields exactly one
//! completion: a task that panics resolves its bot entry as a failure.
//! Tasks have no timeout.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{Id, JoinError, JoinSet};

use codechat_core::config::CodechatConfig;
use codechat_core::types::EntryId;

use crate::client::AskClient;
use crate::controller::ChatController;
use crate::error::ChatError;
use crate::event::{Effect, OutboundRequest, UiEvent};
use crate::voice::{RecognitionSettings, SpeechError, SpeechRecognizer};

/// What a running task was started for.
#[derive(Debug, Clone, Copy)]
enum Background {
    Send { bot_entry: EntryId },
    Voice,
}

impl Background {
    /// Completion event for a task that did not run to the end.
    fn failed(self, err: &JoinError) -> UiEvent {
        match self {
            Background::Send { bot_entry } => UiEvent::AnswerReceived {
                bot_entry,
                outcome: Err(ChatError::Transport(format!("task failed: {}", err))),
            },
            Background::Voice => UiEvent::VoiceFailed(SpeechError::Other("aborted".to_string())),
        }
    }
}

pub struct ChatRuntime {
    controller: ChatController,
    client: Arc<dyn AskClient>,
    recognizer: Arc<dyn SpeechRecognizer>,
    tasks: JoinSet<UiEvent>,
    running: HashMap<Id, Background>,
}

impl ChatRuntime {
    pub fn new(
        config: &CodechatConfig,
        client: Arc<dyn AskClient>,
        recognizer: Arc<dyn SpeechRecognizer>,
    ) -> Self {
        let controller = ChatController::new(config, recognizer.is_available());
        Self {
            controller,
            client,
            recognizer,
            tasks: JoinSet::new(),
            running: HashMap::new(),
        }
    }

    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    /// Number of background tasks whose result has not been dispatched yet.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Dispatch an event, start any background work it asks for, and return
    /// the effects the front end has to render.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, event: UiEvent) -> Vec<Effect> {
        let effects = self.controller.dispatch(event);
        let mut front_end = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::Send(outbound) => self.spawn_send(outbound),
                Effect::StartVoice(settings) => self.spawn_voice(settings),
                other => front_end.push(other),
            }
        }
        front_end
    }

    /// Wait for the next background task to finish and dispatch its result.
    ///
    /// Returns `None` straight away when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Vec<Effect>> {
        let event = match self.tasks.join_next_with_id().await? {
            Ok((id, event)) => {
                self.running.remove(&id);
                event
            }
            Err(err) => {
                let Some(background) = self.running.remove(&err.id()) else {
                    tracing::warn!(error = %err, "Untracked background task failed");
                    return Some(Vec::new());
                };
                tracing::error!(error = %err, task = ?background, "Background task failed");
                background.failed(&err)
            }
        };
        Some(self.dispatch(event))
    }

    /// Drive background tasks until none is left, including tasks started
    /// by the results themselves (a voice result submits a question).
    pub async fn settle(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(batch) = self.next_completion().await {
            effects.extend(batch);
        }
        effects
    }

    fn spawn_send(&mut self, outbound: OutboundRequest) {
        let client = Arc::clone(&self.client);
        let bot_entry = outbound.bot_entry;
        let handle = self.tasks.spawn(async move {
            let outcome = client.ask(&outbound.request).await;
            UiEvent::AnswerReceived {
                bot_entry: outbound.bot_entry,
                outcome,
            }
        });
        self.running
            .insert(handle.id(), Background::Send { bot_entry });
    }

    fn spawn_voice(&mut self, settings: RecognitionSettings) {
        let recognizer = Arc::clone(&self.recognizer);
        let handle = self.tasks.spawn(async move {
            match recognizer.recognize(&settings).await {
                Ok(hypotheses) => match hypotheses.into_iter().next() {
                    Some(top) => UiEvent::VoiceRecognized(top),
                    None => UiEvent::VoiceFailed(SpeechError::NoSpeech),
                },
                Err(err) => UiEvent::VoiceFailed(err),
            }
        });
        self.running.insert(handle.id(), Background::Voice);
    }
}
