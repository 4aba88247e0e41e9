//! Per-user session state.

use codechat_core::config::AttachmentPolicy;
use codechat_core::types::Attachment;

/// Name and pending attachment of the person using the client.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user_name: Option<String>,
    pending_attachment: Option<Attachment>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Bind the name. Only the first call has an effect; the name is never
    /// replaced once set.
    pub fn set_user_name(&mut self, name: String) -> bool {
        if self.user_name.is_some() {
            return false;
        }
        self.user_name = Some(name);
        true
    }

    pub fn pending_attachment(&self) -> Option<&Attachment> {
        self.pending_attachment.as_ref()
    }

    /// Store `attachment`, returning the one it replaced.
    pub fn select_attachment(&mut self, attachment: Attachment) -> Option<Attachment> {
        self.pending_attachment.replace(attachment)
    }

    /// Attachment to send with the next question, applying `policy`.
    pub fn attachment_for_send(&mut self, policy: AttachmentPolicy) -> Option<Attachment> {
        match policy {
            AttachmentPolicy::Persist => self.pending_attachment.clone(),
            AttachmentPolicy::ClearAfterSend => self.pending_attachment.take(),
        }
    }
}
