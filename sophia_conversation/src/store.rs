//! In-memory session store keyed by user id.
//!
//! Sessions are created lazily and live as long as the process. The store
//! is a cheap cloneable handle; clones share the same map.

use crate::session::{Session, SessionState};
use sophia_core::Turn;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Default number of user/assistant turn pairs kept per session.
pub const DEFAULT_MAX_HISTORY: usize = 6;

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<u64, Session>>>,
    max_history: usize,
}

impl SessionStore {
    /// `max_history` counts turn pairs; a session keeps at most twice that
    /// many turns.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            max_history,
        }
    }

    #[must_use]
    pub const fn max_history(&self) -> usize {
        self.max_history
    }

    const fn capacity(&self) -> usize {
        self.max_history.saturating_mul(2)
    }

    /// Snapshot of the user's session, creating an empty one if absent.
    pub async fn get_or_create(&self, user_id: u64) -> Session {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(user_id)
            .or_insert_with(|| {
                debug!("Creating session for user {user_id}");
                Session::default()
            })
            .clone()
    }

    /// Snapshot without creating. Used where reading must not mutate.
    pub async fn get(&self, user_id: u64) -> Option<Session> {
        self.sessions.lock().await.get(&user_id).cloned()
    }

    pub async fn state(&self, user_id: u64) -> SessionState {
        self.get(user_id)
            .await
            .map_or(SessionState::AwaitingName, |s| s.state())
    }

    pub async fn set_name(&self, user_id: u64, name: impl Into<String>) {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(user_id).or_default().name = Some(name.into());
    }

    /// Append a turn and trim the history to the most recent
    /// `2 * max_history` entries.
    pub async fn append_turn(&self, user_id: u64, turn: Turn) {
        let capacity = self.capacity();
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(user_id)
            .or_default()
            .push_bounded(turn, capacity);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
