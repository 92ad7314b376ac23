use crate::command::CommandStrategy;
use sophia_config::Config;
use sophia_telegram::TelegramBot;
use tracing::info;

/// Input for Telegram bot command.
pub struct TelegramInput {
    /// Optional bot token (overrides config)
    pub token: Option<String>,
}

/// Strategy for running the Telegram bot.
pub struct TelegramStrategy;

impl CommandStrategy for TelegramStrategy {
    type Input = TelegramInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(token) = input.token {
            config.telegram.token = token;
        }
        let token = config.require_token()?.to_string();

        info!("Starting Telegram bot...");

        let router = super::build_router(&config);
        let bot = TelegramBot::new(token, router);

        info!("Telegram bot is running. Press Ctrl+C to stop.");
        bot.run().await?;

        Ok(())
    }
}
