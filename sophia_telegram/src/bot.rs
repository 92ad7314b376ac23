use crate::{Command, Result};
use sophia_conversation::MessageRouter;
use sophia_core::CompletionClient;
use std::time::Duration;
use teloxide::{ApiError, RequestError, prelude::*};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Telegram front end of the relay.
pub struct TelegramBot<C> {
    /// Teloxide bot instance
    pub bot: Bot,
    router: MessageRouter<C>,
    /// Bot username, known after the connection check
    username: String,
}

impl<C> Clone for TelegramBot<C> {
    fn clone(&self) -> Self {
        Self {
            bot: self.bot.clone(),
            router: self.router.clone(),
            username: self.username.clone(),
        }
    }
}

impl<C> TelegramBot<C>
where
    C: CompletionClient + 'static,
{
    pub fn new(token: impl Into<String>, router: MessageRouter<C>) -> Self {
        Self {
            bot: Bot::new(token),
            router,
            username: String::new(),
        }
    }

    #[must_use]
    pub const fn router(&self) -> &MessageRouter<C> {
        &self.router
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Resolve the bot identity with `getMe`.
    ///
    /// A rejected token fails at once; any other error is retried after
    /// `reconnect_delay`.
    async fn connect(&mut self) -> Result<()> {
        let mut attempt = 1u32;
        loop {
            match self.bot.get_me().await {
                Ok(me) => {
                    self.username = me.user.username.clone().unwrap_or_default();
                    info!("Connected to Telegram as @{} (id: {})", self.username, me.user.id);
                    return Ok(());
                }
                Err(RequestError::Api(ApiError::InvalidToken)) => {
                    return Err(RequestError::Api(ApiError::InvalidToken).into());
                }
                Err(e) => {
                    let delay = reconnect_delay(attempt);
                    warn!(
                        "Telegram unreachable (attempt {attempt}): {e}. Retrying in {}s",
                        delay.as_secs()
                    );
                    sleep(delay).await;
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }

    /// Run the bot until Ctrl+C.
    pub async fn run(mut self) -> Result<()> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::dptree;
        use teloxide::error_handlers::LoggingErrorHandler;
        use teloxide::types::Update;

        self.connect().await?;

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Failed to register bot commands: {e}");
        }

        let bot = self.bot.clone();

        let schema = dptree::entry().branch(Update::filter_message().endpoint({
            let bot_clone = self.clone();
            move |msg: Message| {
                let bot_clone = bot_clone.clone();
                async move { crate::handler::handle_message(bot_clone, msg).await }
            }
        }));

        info!(
            "Soph_IA is online on Telegram (model: {})",
            self.router.client().model()
        );

        Dispatcher::builder(bot, schema)
            .default_handler(|update| async move {
                debug!("Ignoring unsupported update {}", update.id.0);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "Error while handling a Telegram update",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}

/// 2s after the first failure, growing by 2s per attempt up to 10s.
fn reconnect_delay(attempt: u32) -> Duration {
    Duration::from_secs((2 * u64::from(attempt)).min(10))
}
