use crate::command::CommandStrategy;
use parley_config::Config;
use parley_conversation::{RateLimiter, SessionConfig, SessionManager};
use parley_providers::{DEFAULT_MODEL, OpenAIProvider};
use parley_store::DatabaseHistoryStore;
use parley_telegram::{TelegramBot, TelegramTransport};
use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;
use tokio::time::sleep;
use tracing::{info, warn};

/// Connect to the history database, retrying until it is reachable.
///
/// Delays double from 1s and are capped at 3s.
async fn connect_store_with_retry(database_url: &str) -> DatabaseHistoryStore {
    const MAX_DELAY: Duration = Duration::from_secs(3);
    const INITIAL_DELAY: Duration = Duration::from_secs(1);

    let mut attempt = 0u32;
    let mut delay = INITIAL_DELAY;

    loop {
        attempt += 1;
        match DatabaseHistoryStore::connect(database_url).await {
            Ok(store) => {
                info!("History store connected on attempt {attempt}");
                return store;
            }
            Err(e) => {
                warn!(
                    "Failed to connect to database (attempt {attempt}): {e}. Retrying in {}s...",
                    delay.as_secs()
                );
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Build the session settings from the provider section.
/// A blank model name falls back to [`DEFAULT_MODEL`].
fn session_config(config: &Config) -> SessionConfig {
    let model = config.provider.model.trim();
    let model = if model.is_empty() { DEFAULT_MODEL } else { model };

    SessionConfig::default()
        .with_model(model.to_string())
        .with_system_prompt(config.provider.system_prompt.clone())
        .with_completion_timeout(config.provider.timeout())
}

/// Input for the `run` command.
pub struct RunInput {
    /// Bot token, overriding config and environment
    pub token: Option<String>,
    /// Model name, overriding config and environment
    pub model: Option<String>,
}

/// Runs the Telegram relay until Ctrl+C.
pub struct RunStrategy;

impl CommandStrategy for RunStrategy {
    type Input = RunInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(token) = input.token {
            config.telegram.token = token;
        }
        if let Some(model) = input.model {
            config.provider.model = model;
        }
        config.validate()?;

        info!("Starting Telegram relay...");

        let provider = OpenAIProvider::new(config.provider.api_key.clone())
            .with_base_url(config.provider.base_url.clone());
        info!("Completion endpoint: {}", provider.base_url());

        let store = connect_store_with_retry(&config.database.url).await;

        let limiter = RateLimiter::new(config.rate_limit.window())
            .with_max_tracked_users(config.rate_limit.max_tracked_users);

        let bot = Bot::new(config.telegram.token.clone());
        let transport = TelegramTransport::new(bot.clone());

        let sessions = SessionManager::new(
            Arc::new(provider),
            Arc::new(store),
            Arc::new(transport),
            Arc::new(limiter),
            session_config(&config),
        );

        TelegramBot::new(bot, Arc::new(sessions)).run().await?;
        Ok(())
    }
}
