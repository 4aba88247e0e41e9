use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Author of a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Typed or dictated by the person at the keyboard.
    User,
    /// Produced by the backend (or by the client on its behalf).
    Bot,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Bot => write!(f, "bot"),
        }
    }
}

/// Whether an entry still waits for its response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Final,
    /// Placeholder shown while the request is in flight.
    Pending,
}

/// Which screen is visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Name entry step. Initial view.
    #[default]
    Welcome,
    /// Transcript and input field.
    Chat,
}

// =============================================================================
// Transcript
// =============================================================================

/// Position of an entry in the transcript.
///
/// The transcript is append-only, so the position never changes once issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub usize);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 + 1)
    }
}

/// A single rendered message in the transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: EntryId,
    pub role: Role,
    /// Raw message text, without the bot marker.
    pub text: String,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranscriptEntry {
    /// Returns whether the entry is still a placeholder.
    pub fn is_pending(&self) -> bool {
        self.status == EntryStatus::Pending
    }

    /// Text as shown to the user: bot entries carry the marker.
    pub fn display_text(&self, bot_marker: &str) -> String {
        match self.role {
            Role::User => self.text.clone(),
            Role::Bot if bot_marker.is_empty() => self.text.clone(),
            Role::Bot => format!("{} {}", bot_marker, self.text),
        }
    }
}

// =============================================================================
// Attachment
// =============================================================================

/// Handle to a user-selected local file.
///
/// Only the path is held; the contents are read when a request is built, so
/// edits made to the file after selection are picked up by the next question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub path: PathBuf,
    pub file_name: String,
}

impl Attachment {
    /// Create a handle for the file at `path`.
    ///
    /// The file name falls back to the full path when it has no final component.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { path, file_name }
    }

    /// MIME type guessed from the extension.
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    /// Short label shown next to the input field.
    pub fn label(&self) -> String {
        format!("Selected: {}", self.file_name)
    }

    /// Confirmation surfaced when the file is picked.
    pub fn ready_notice(&self) -> String {
        format!(
            "📁 File \"{}\" is ready to be used with your next question.",
            self.file_name
        )
    }
}
