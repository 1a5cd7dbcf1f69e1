use crate::Result;
use crate::command::bot_commands;
use parley_conversation::SessionManager;
use std::{sync::Arc, time::Duration};
use teloxide::prelude::*;
use tokio::time::sleep;
use tracing::{info, warn};

/// Telegram front end for the session manager.
#[derive(Clone)]
pub struct TelegramBot {
    /// Teloxide bot instance
    pub bot: Bot,
    /// Shared handler for every chat
    pub sessions: Arc<SessionManager>,
}

impl TelegramBot {
    #[must_use]
    pub const fn new(bot: Bot, sessions: Arc<SessionManager>) -> Self {
        Self { bot, sessions }
    }

    /// Test connection to Telegram API with a growing retry delay.
    /// Starts at 2s, increases by 2s each attempt, max 10s delay.
    /// Retries indefinitely until connection succeeds.
    async fn test_connection(&self) {
        const INITIAL_DELAY_SECS: u64 = 2;
        const MAX_DELAY_SECS: u64 = 10;

        let mut attempt = 1u64;
        loop {
            match self.bot.get_me().await {
                Ok(me) => {
                    info!(
                        "Connected to Telegram API: @{} (id: {})",
                        me.user
                            .username
                            .as_deref()
                            .unwrap_or("no username"),
                        me.user.id
                    );
                    return;
                }
                Err(e) => {
                    let delay_secs = (INITIAL_DELAY_SECS * attempt).min(MAX_DELAY_SECS);

                    warn!("Connection attempt {attempt} failed: {e}. Retrying in {delay_secs}s...");

                    if attempt == 1 {
                        warn!("This may be due to:");
                        warn!("  - Network connectivity issues");
                        warn!("  - Firewall blocking api.telegram.org");
                        warn!("  - Invalid bot token");
                        warn!("  - Telegram API being temporarily unavailable");
                    }

                    sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn register_commands(&self) -> Result<()> {
        self.bot.set_my_commands(bot_commands()).await?;
        Ok(())
    }

    /// Run the bot until Ctrl+C.
    pub async fn run(self) -> Result<()> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::dptree;
        use teloxide::types::Update;

        self.test_connection().await;

        if let Err(e) = self.register_commands().await {
            warn!("Failed to register command menu: {e}");
        }

        let bot = self.bot.clone();

        let schema = dptree::entry().branch(Update::filter_message().endpoint({
            let bot_clone = self.clone();
            move |msg: Message| {
                let bot_clone = bot_clone.clone();
                async move { crate::handler::handle_message(bot_clone, msg).await }
            }
        }));

        info!("Telegram bot is running. Press Ctrl+C to stop.");

        Dispatcher::builder(bot, schema)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram bot stopped");
        Ok(())
    }
}
