use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use teloxide::{dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*};
use tokio::sync::Mutex;
use tracing::{info, warn};

use relaybot_core::{
    config::Config, messaging::port::MessagingPort, model::client::CompletionClient,
    relay::Relay, stats::StatsStore,
};

use crate::handlers;
use crate::TelegramMessenger;

static CONNECTED: AtomicBool = AtomicBool::new(false);

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// Marks the process as connected to Telegram for as long as it is alive.
struct ConnectionGuard;

impl ConnectionGuard {
    fn claim() -> Option<Self> {
        CONNECTED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| ConnectionGuard)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        CONNECTED.store(false, Ordering::SeqCst);
    }
}

/// Connect and dispatch updates until the dispatcher stops.
///
/// Updates are handled one at a time in arrival order. A second call while a
/// connection is live does not log in again.
pub async fn run_polling(
    cfg: Arc<Config>,
    store: StatsStore,
    completions: Arc<dyn CompletionClient>,
) -> anyhow::Result<()> {
    let Some(_connection) = ConnectionGuard::claim() else {
        warn!("telegram client already connected, skipping login");
        return Ok(());
    };

    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let me = bot.get_me().await.context("telegram login failed")?;
    info!("bot instance ready as @{}", me.username());
    info!(
        accounts = cfg.accounts.len(),
        log_chat = ?cfg.log_chat_id,
        allowed_topic = ?cfg.allowed_topic,
        "routing configured"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let relay = Arc::new(Relay::new(
        cfg,
        Arc::new(Mutex::new(store)),
        messenger,
        completions,
    ));
    let state = Arc::new(AppState { relay });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        // One distribution key: every update waits for the previous one.
        .distribution_function(|_| Some(()))
        .error_handler(LoggingErrorHandler::with_custom_text(
            "unhandled error in message handler",
        ))
        .build()
        .dispatch()
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_guard_is_exclusive_until_dropped() {
        let first = ConnectionGuard::claim();
        assert!(first.is_some());
        assert!(ConnectionGuard::claim().is_none());

        drop(first);
        let again = ConnectionGuard::claim();
        assert!(again.is_some());
    }
}
