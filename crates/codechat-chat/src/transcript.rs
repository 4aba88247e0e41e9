//! Append-only transcript of rendered messages.

use chrono::Utc;

use codechat_core::types::{EntryId, EntryStatus, Role, TranscriptEntry};

/// Ordered list of transcript entries.
///
/// Entries are never removed or reordered. The only mutation allowed after
/// append is resolving a pending entry to its final text.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&TranscriptEntry> {
        self.entries.get(id.0)
    }

    /// Most recent bot entry, if any.
    pub fn last_bot(&self) -> Option<&TranscriptEntry> {
        self.entries.iter().rev().find(|e| e.role == Role::Bot)
    }

    /// Entries still waiting for a response.
    pub fn pending(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter().filter(|e| e.is_pending())
    }

    pub fn append(&mut self, role: Role, text: String, status: EntryStatus) -> EntryId {
        let id = EntryId(self.entries.len());
        let now = Utc::now();
        self.entries.push(TranscriptEntry {
            id,
            role,
            text,
            status,
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Replace the text of a pending entry and mark it final.
    ///
    /// Returns `false` when the entry does not exist or is already final.
    pub fn resolve(&mut self, id: EntryId, text: String) -> bool {
        match self.entries.get_mut(id.0) {
            Some(entry) if entry.is_pending() => {
                entry.text = text;
                entry.status = EntryStatus::Final;
                entry.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }
}
