//! Local terminal conversation through the same router the bot uses.

use async_trait::async_trait;
use sophia_config::Config;
use sophia_conversation::Responder;
use sophia_telegram::to_inbound;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone, Copy)]
pub struct ChatInput {
    /// Session key, standing in for a Telegram user id
    pub user_id: u64,
}

struct TerminalResponder;

#[async_trait]
impl Responder for TerminalResponder {
    async fn typing(&self) -> anyhow::Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(b"...\n").await?;
        stdout.flush().await?;
        Ok(())
    }

    async fn reply(&self, text: &str) -> anyhow::Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format!("\n{text}\n\n").as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let router = super::build_router(&config);

        info!("Starting terminal session for user {}", input.user_id);
        println!("=== Soph_IA ===");
        println!("Type /start to begin, 'exit' or 'quit' to leave.\n");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            if matches!(line.trim(), "exit" | "quit" | "q") {
                break;
            }

            let Some(inbound) = to_inbound(&line, "") else {
                println!("(commande inconnue)");
                continue;
            };

            router
                .dispatch(input.user_id, inbound, &TerminalResponder)
                .await?;
        }

        let turns = router
            .store()
            .get(input.user_id)
            .await
            .map_or(0, |s| s.history.len());
        info!("Session ended with {turns} turns in history");

        Ok(())
    }
}
