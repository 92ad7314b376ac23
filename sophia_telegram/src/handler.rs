use crate::{Command, Result, TelegramBot};
use async_trait::async_trait;
use sophia_conversation::{Inbound, Responder};
use sophia_core::CompletionClient;
use teloxide::{
    prelude::*,
    types::{ChatAction, ChatId, Message},
};
use tracing::{debug, info};

/// Replies into one Telegram chat.
pub struct ChatResponder {
    bot: Bot,
    chat_id: ChatId,
}

impl ChatResponder {
    #[must_use]
    pub const fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl Responder for ChatResponder {
    async fn typing(&self) -> anyhow::Result<()> {
        self.bot
            .send_chat_action(self.chat_id, ChatAction::Typing)
            .await?;
        Ok(())
    }

    async fn reply(&self, text: &str) -> anyhow::Result<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }
}

/// Map raw message text to a router event.
///
/// Bot commands other than `/start` are dropped. Text that merely begins
/// with `/` without forming a command is ordinary text.
#[must_use]
pub fn to_inbound(text: &str, bot_name: &str) -> Option<Inbound> {
    if Command::is_command(text) {
        return Command::parse_from_text(text, bot_name).map(|cmd| match cmd {
            Command::Start => Inbound::Start,
        });
    }
    Some(Inbound::Text(text.to_string()))
}

/// Handle one incoming Telegram message.
pub async fn handle_message<C>(bot: TelegramBot<C>, msg: Message) -> Result<()>
where
    C: CompletionClient + 'static,
{
    let Some(text) = msg.text() else {
        debug!("Ignoring non-text message in chat {}", msg.chat.id);
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        debug!("Ignoring message without sender in chat {}", msg.chat.id);
        return Ok(());
    };
    let username = user.username.as_deref().unwrap_or("unknown");

    let Some(inbound) = to_inbound(text, bot.username()) else {
        debug!("[@{username}] Ignoring unsupported command: {text}");
        return Ok(());
    };

    match &inbound {
        Inbound::Start => info!("[@{username}] Command: /start"),
        Inbound::Text(text) => info!("[@{username}] Message: {text}"),
    }

    let responder = ChatResponder::new(bot.bot.clone(), msg.chat.id);
    bot.router()
        .dispatch(user.id.0, inbound, &responder)
        .await?;

    Ok(())
}
