//! Lifecycle of one question/answer exchange.
//!
//! Valid transitions:
//! - Composing -> Submitted (question accepted, placeholder appended)
//! - Submitted -> Resolved (answer received)
//! - Submitted -> Failed (request failed)
//!
//! Resolved and Failed are terminal.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use codechat_core::types::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeState {
    Composing,
    /// Request in flight, bot entry pending.
    Submitted,
    Resolved,
    Failed,
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeState::Composing => write!(f, "Composing"),
            ExchangeState::Submitted => write!(f, "Submitted"),
            ExchangeState::Resolved => write!(f, "Resolved"),
            ExchangeState::Failed => write!(f, "Failed"),
        }
    }
}

impl ExchangeState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &ExchangeState) -> bool {
        matches!(
            (self, target),
            (ExchangeState::Composing, ExchangeState::Submitted)
                | (ExchangeState::Submitted, ExchangeState::Resolved)
                | (ExchangeState::Submitted, ExchangeState::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExchangeState::Resolved | ExchangeState::Failed)
    }
}

/// A user entry paired with the bot entry answering it.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub id: Uuid,
    pub user_entry: EntryId,
    pub bot_entry: EntryId,
    pub with_attachment: bool,
    pub started_at: DateTime<Utc>,
    state: ExchangeState,
}

impl Exchange {
    /// Create an exchange in the `Composing` state.
    pub fn new(user_entry: EntryId, bot_entry: EntryId, with_attachment: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_entry,
            bot_entry,
            with_attachment,
            started_at: Utc::now(),
            state: ExchangeState::Composing,
        }
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Move to `target` if the transition is valid. The state is left
    /// untouched and `false` returned otherwise.
    pub fn advance(&mut self, target: ExchangeState) -> bool {
        if self.state.can_transition_to(&target) {
            tracing::debug!(exchange_id = %self.id, "Exchange state: {} -> {}", self.state, target);
            self.state = target;
            true
        } else {
            tracing::warn!(
                exchange_id = %self.id,
                "Invalid exchange transition: {} -> {}",
                self.state,
                target
            );
            false
        }
    }
}
