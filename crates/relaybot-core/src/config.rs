use std::{env, path::PathBuf};

use crate::{
    accounts::AccountRegistry,
    domain::{ChatId, ThreadId, TopicRef},
    errors::Error,
    Result,
};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_STATS_FILE: &str = "stats.json";

/// Account names paired with the env var that carries their origin chat id.
const ACCOUNT_VARS: [(&str, &str); 2] = [("server1", "SERVER1_ID"), ("server2", "SERVER2_ID")];

/// Typed configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub telegram_bot_token: String,
    pub openai_api_key: String,

    // Routing
    pub accounts: AccountRegistry,
    pub log_chat_id: Option<ChatId>,
    pub allowed_topic: Option<TopicRef>,

    // Completion
    pub openai_base_url: String,
    pub model: String,
    pub system_prompt: String,

    // Runtime
    pub port: u16,
    pub stats_file: PathBuf,
}

impl Config {
    /// Load from the process environment, after merging a `.env` file from the
    /// working directory (existing variables are not overridden).
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;
        let openai_api_key = get("OPENAI_API_KEY").ok_or_else(|| {
            Error::Config("OPENAI_API_KEY environment variable is required".to_string())
        })?;

        let mut pairs = Vec::new();
        for (name, var) in ACCOUNT_VARS {
            if let Some(raw) = get(var) {
                pairs.push((name.to_string(), ChatId(parse_num(var, &raw)?)));
            }
        }
        let accounts = AccountRegistry::new(pairs);

        let log_chat_id = get("LOG_CHAT_ID")
            .map(|raw| parse_num("LOG_CHAT_ID", &raw).map(ChatId))
            .transpose()?;
        let allowed_topic = match (get("ALLOWED_TOPIC_CHAT_ID"), get("ALLOWED_TOPIC_ID")) {
            (Some(chat), Some(thread)) => Some(TopicRef {
                chat_id: ChatId(parse_num("ALLOWED_TOPIC_CHAT_ID", &chat)?),
                thread_id: ThreadId(parse_num("ALLOWED_TOPIC_ID", &thread)?),
            }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "ALLOWED_TOPIC_CHAT_ID and ALLOWED_TOPIC_ID must be set together".to_string(),
                ))
            }
        };

        let openai_base_url = get("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let system_prompt =
            get("SYSTEM_PROMPT").unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let port = get("PORT")
            .map(|raw| parse_num("PORT", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);
        let stats_file = PathBuf::from(
            get("STATS_FILE").unwrap_or_else(|| DEFAULT_STATS_FILE.to_string()),
        );

        Ok(Self {
            telegram_bot_token,
            openai_api_key,
            accounts,
            log_chat_id,
            allowed_topic,
            openai_base_url,
            model,
            system_prompt,
            port,
            stats_file,
        })
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| Error::Config(format!("{key} must be a number, got {raw:?}")))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
