use std::sync::Arc;

use tracing::info;

use relaybot_core::{
    config::Config,
    model::client::CompletionClient,
    stats::{JsonFileBackend, StatsStore},
};
use relaybot_openai::OpenAiClient;

mod health;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), relaybot_core::Error> {
    relaybot_core::logging::init("relaybot")?;
    relaybot_core::logging::install_panic_hook();
    info!(pid = std::process::id(), "bot is starting");

    let cfg = Arc::new(Config::load()?);

    let backend = JsonFileBackend::new(cfg.stats_file.clone());
    info!(path = %backend.path().display(), "loading stats");
    let store = StatsStore::open(backend)?;

    let completions: Arc<dyn CompletionClient> = Arc::new(OpenAiClient::new(
        cfg.openai_api_key.clone(),
        cfg.openai_base_url.clone(),
    )?);

    let listener = health::bind(cfg.port).await?;
    tokio::spawn(health::serve(listener));

    relaybot_telegram::router::run_polling(cfg, store, completions)
        .await
        .map_err(|e| relaybot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
