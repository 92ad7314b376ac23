//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input type, so
//! dispatch in `main` is monomorphized.

use sophia_config::Config;
use sophia_conversation::{MessageRouter, SessionStore};
use sophia_providers::ChatCompletionsClient;
use std::time::Duration;
use tracing::info;

mod chat;
mod info;
mod init;
mod telegram;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use telegram::{TelegramInput, TelegramStrategy};
pub use version::VersionStrategy;

/// Build the completion client and router shared by `run` and `chat`.
fn build_router(config: &Config) -> MessageRouter<ChatCompletionsClient> {
    let client = ChatCompletionsClient::new(&config.model.api_url, &config.model.name)
        .with_api_key(config.model.api_key.clone())
        .with_timeout(Duration::from_secs(config.model.timeout_secs));

    let store = SessionStore::new(config.model.max_history);
    info!(
        "Conversation history: {} turn pairs per user",
        store.max_history()
    );

    MessageRouter::new(store, client)
}

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
