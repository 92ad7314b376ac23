//! Routes inbound chat events through the per-user state machine.
//!
//! `AwaitingName` captures the first non-empty text as the user's name.
//! `Chatting` relays text to the completion endpoint and records both sides
//! of the exchange. The router is transport-agnostic: replies go through a
//! `Responder`.

use crate::prompt::build_prompt;
use crate::store::SessionStore;
use async_trait::async_trait;
use sophia_core::{CompletionClient, Turn};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// User-facing reply texts.
pub mod replies {
    use std::fmt::Display;

    #[must_use]
    pub const fn greeting_new() -> &'static str {
        "Bonjour, je suis Soph_IA. Quel est ton prénom ?"
    }

    #[must_use]
    pub fn greeting_known(name: &str) -> String {
        format!("Bonjour {name}, je suis Soph_IA, prête à t’écouter.")
    }

    #[must_use]
    pub fn name_ack(name: &str) -> String {
        format!("Enchantée {name}. Tu peux maintenant poser une question.")
    }

    #[must_use]
    pub fn failure(err: &impl Display) -> String {
        format!("Erreur: {err}")
    }
}

/// A recognised inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// The `/start` command.
    Start,
    /// Free text, untrimmed.
    Text(String),
}

/// Outbound side of a chat.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Signal that a reply is being prepared.
    async fn typing(&self) -> anyhow::Result<()>;

    async fn reply(&self, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Failed to deliver reply: {0}")]
    Responder(#[from] anyhow::Error),
}

pub struct MessageRouter<C> {
    store: SessionStore,
    client: Arc<C>,
}

impl<C> Clone for MessageRouter<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: CompletionClient> MessageRouter<C> {
    pub fn new(store: SessionStore, client: C) -> Self {
        Self {
            store,
            client: Arc::new(client),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Handle one inbound event for `user_id`.
    ///
    /// Completion failures are reported to the user and never returned.
    /// Only delivery failures surface as errors.
    pub async fn dispatch<R>(
        &self,
        user_id: u64,
        inbound: Inbound,
        out: &R,
    ) -> Result<(), RouterError>
    where
        R: Responder + ?Sized,
    {
        match inbound {
            Inbound::Start => self.on_start(user_id, out).await,
            Inbound::Text(text) => self.on_text(user_id, &text, out).await,
        }
    }

    async fn on_start<R>(&self, user_id: u64, out: &R) -> Result<(), RouterError>
    where
        R: Responder + ?Sized,
    {
        let name = self.store.get(user_id).await.and_then(|s| s.name);
        match name {
            None => out.reply(replies::greeting_new()).await?,
            Some(name) => out.reply(&replies::greeting_known(&name)).await?,
        }
        Ok(())
    }

    async fn on_text<R>(&self, user_id: u64, text: &str, out: &R) -> Result<(), RouterError>
    where
        R: Responder + ?Sized,
    {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring empty message from user {user_id}");
            return Ok(());
        }

        let Some(name) = self.store.get_or_create(user_id).await.name else {
            info!("User {user_id} introduced as {text}");
            self.store.set_name(user_id, text).await;
            out.reply(&replies::name_ack(text)).await?;
            return Ok(());
        };

        self.store.append_turn(user_id, Turn::user(text)).await;
        let history = self.store.get_or_create(user_id).await.history;
        let prior = &history[..history.len().saturating_sub(1)];
        let turns = build_prompt(&name, prior, text);

        out.typing().await?;

        match self.client.complete(&turns).await {
            Ok(reply) => {
                self.store
                    .append_turn(user_id, Turn::assistant(reply.clone()))
                    .await;
                out.reply(&reply).await?;
            }
            Err(e) => {
                warn!("Completion failed for user {user_id}: {e}");
                out.reply(&replies::failure(&e)).await?;
            }
        }

        Ok(())
    }
}
