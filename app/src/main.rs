#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Parser, Subcommand};
use command::{
    ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy, TelegramInput,
    TelegramStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "sophia")]
#[command(about = "Soph_IA, a Telegram companion backed by a chat-completion model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot (default)
    Run {
        /// Bot token (overrides TELEGRAM_BOT_TOKEN)
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Talk to Soph_IA from the terminal
    Chat {
        /// Session key used for the local conversation
        #[arg(short, long, default_value_t = 0)]
        user_id: u64,
    },
    /// Create the configuration file
    Init,
    /// Show the effective configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run { token: None }) {
        Commands::Run { token } => TelegramStrategy.execute(TelegramInput { token }).await,
        Commands::Chat { user_id } => ChatStrategy.execute(ChatInput { user_id }).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
