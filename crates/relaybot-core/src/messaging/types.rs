use crate::domain::{ChatId, MessageRef, ThreadId};

/// Read-only view of an incoming chat message.
///
/// Platform-specific fields stay in the adapter.
#[derive(Clone, Debug)]
pub struct IncomingMessage {
    pub message: MessageRef,
    pub author_is_bot: bool,
    /// Container the message was posted in (the account origin).
    pub origin: ChatId,
    /// Grouping the conversation sits under, if any.
    pub parent: Option<ThreadId>,
    /// Raw text as sent.
    pub text: String,
}

impl IncomingMessage {
    /// Text with surrounding whitespace removed; commands are matched on this.
    pub fn content(&self) -> &str {
        self.text.trim()
    }
}
