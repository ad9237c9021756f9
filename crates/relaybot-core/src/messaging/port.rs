use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Cross-messenger port.
///
/// Only plain text goes out: replies in the originating conversation and
/// standalone posts to a known chat (the log destination).
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Reply to `to` in the same conversation.
    async fn reply_text(&self, to: MessageRef, text: &str) -> Result<MessageRef>;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;
}
