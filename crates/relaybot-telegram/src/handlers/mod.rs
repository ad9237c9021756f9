//! Telegram update handlers.
//!
//! Each handler converts a teloxide update into the core's message view and
//! hands it to the relay. Errors returned here reach the dispatcher's error
//! handler, which logs them and keeps polling.

use std::sync::Arc;

use teloxide::types::Message;
use tracing::debug;

use relaybot_core::Result;

use crate::router::AppState;

mod text;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> Result<()> {
    let Some(incoming) = text::incoming_message(&msg) else {
        return Ok(());
    };

    let outcome = state.relay.handle(&incoming).await?;
    debug!(chat_id = incoming.origin.0, ?outcome, "message handled");
    Ok(())
}
