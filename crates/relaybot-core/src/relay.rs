//! Message relay: command dispatch plus the completion pipeline.
//!
//! `route` decides what a message is without touching any state. `Relay`
//! carries the decision out against the stats store and the two ports.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    accounts::AccountRegistry,
    commands::{format_log_line, format_stats, Command, COMPLETION_FAILED_REPLY, RESET_REPLY},
    config::Config,
    domain::{ChatId, TopicRef},
    errors::Error,
    messaging::{port::MessagingPort, types::IncomingMessage},
    model::{client::CompletionClient, types::CompletionRequest},
    stats::{StatField, StatsStore},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Ignore,
    Command { account: String, command: Command },
    Complete { account: String },
}

/// Classify an incoming message.
///
/// Bot authors and unregistered origins are dropped before anything else.
/// Commands are honoured anywhere in a registered origin; completions only
/// under the allow-listed topic of the allow-listed chat.
pub fn route(
    msg: &IncomingMessage,
    accounts: &AccountRegistry,
    allowed_topic: Option<TopicRef>,
) -> Route {
    if msg.author_is_bot {
        return Route::Ignore;
    }
    let Some(account) = accounts.account_for(msg.origin) else {
        return Route::Ignore;
    };
    let account = account.to_string();

    if let Some(command) = Command::parse(msg.content()) {
        return Route::Command { account, command };
    }

    match (msg.parent, allowed_topic) {
        (Some(parent), Some(allowed))
            if msg.origin == allowed.chat_id && parent == allowed.thread_id =>
        {
            Route::Complete { account }
        }
        _ => Route::Ignore,
    }
}

/// What `Relay::handle` did with a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Replied,
    /// The completion step failed and the failure notice was sent instead.
    Failed,
}

/// Fire-and-forget post to the log destination.
///
/// `post` has no error path: an unset destination is skipped and a failed
/// send is logged.
#[derive(Clone)]
pub struct LogMirror {
    messenger: Arc<dyn MessagingPort>,
    chat_id: Option<ChatId>,
}

impl LogMirror {
    pub fn new(messenger: Arc<dyn MessagingPort>, chat_id: Option<ChatId>) -> Self {
        Self { messenger, chat_id }
    }

    pub async fn post(&self, line: &str) {
        let Some(chat_id) = self.chat_id else {
            debug!("log mirror disabled, skipping summary");
            return;
        };
        if let Err(e) = self.messenger.send_text(chat_id, line).await {
            warn!("logging failed: {e}");
        }
    }
}

pub struct Relay {
    cfg: Arc<Config>,
    store: Arc<Mutex<StatsStore>>,
    messenger: Arc<dyn MessagingPort>,
    completions: Arc<dyn CompletionClient>,
    mirror: LogMirror,
}

impl Relay {
    pub fn new(
        cfg: Arc<Config>,
        store: Arc<Mutex<StatsStore>>,
        messenger: Arc<dyn MessagingPort>,
        completions: Arc<dyn CompletionClient>,
    ) -> Self {
        let mirror = LogMirror::new(messenger.clone(), cfg.log_chat_id);
        Self {
            cfg,
            store,
            messenger,
            completions,
            mirror,
        }
    }

    /// Handle one message to completion.
    ///
    /// Errors are persistence failures or a failed command reply; completion
    /// failures are answered in-chat and reported as `Outcome::Failed`.
    pub async fn handle(&self, msg: &IncomingMessage) -> Result<Outcome> {
        match route(msg, &self.cfg.accounts, self.cfg.allowed_topic) {
            Route::Ignore => Ok(Outcome::Ignored),
            Route::Command { account, command } => {
                self.run_command(msg, &account, command).await
            }
            Route::Complete { account } => self.complete(msg, &account).await,
        }
    }

    async fn run_command(
        &self,
        msg: &IncomingMessage,
        account: &str,
        command: Command,
    ) -> Result<Outcome> {
        let reply = match command {
            Command::Stats { target } => {
                let target = target.unwrap_or_else(|| account.to_string());
                let stats = self.store.lock().await.get(&target);
                format_stats(&target, stats)
            }
            Command::Reset(scope) => {
                self.store.lock().await.reset(account)?;
                info!(account, ?scope, "stats reset");
                RESET_REPLY.to_string()
            }
            Command::Unknown => return Ok(Outcome::Ignored),
        };

        self.messenger.reply_text(msg.message, &reply).await?;
        Ok(Outcome::Replied)
    }

    async fn complete(&self, msg: &IncomingMessage, account: &str) -> Result<Outcome> {
        // Counted before the call: a failed completion still costs an input.
        let counted = self
            .store
            .lock()
            .await
            .increment(account, StatField::Inputs, 1)?;
        debug!(account, inputs = counted.inputs, "input recorded");

        let req = CompletionRequest {
            model: self.cfg.model.clone(),
            system: self.cfg.system_prompt.clone(),
            user: msg.text.clone(),
        };

        let answered = match self.completions.complete(req).await {
            Ok(c) if c.text.trim().is_empty() => {
                Err(Error::External("completion returned empty text".to_string()))
            }
            Ok(c) => {
                let sent = self.messenger.reply_text(msg.message, &c.text).await;
                sent.map(|_| c)
            }
            Err(e) => Err(e),
        };

        let completion = match answered {
            Ok(c) => c,
            Err(e) => {
                error!(account, "completion failed: {e}");
                if let Err(e) = self
                    .messenger
                    .reply_text(msg.message, COMPLETION_FAILED_REPLY)
                    .await
                {
                    warn!(account, "failure notice not delivered: {e}");
                }
                return Ok(Outcome::Failed);
            }
        };

        let current = match completion.usage {
            Some(usage) => self.store.lock().await.increment(
                account,
                StatField::Tokens,
                usage.total_tokens,
            )?,
            None => self.store.lock().await.get(account),
        };
        info!(
            account,
            inputs = current.inputs,
            tokens = current.tokens,
            "completion relayed"
        );

        self.mirror.post(&format_log_line(account, current)).await;
        Ok(Outcome::Replied)
    }
}
