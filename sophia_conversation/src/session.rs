//! Per-user conversational state.

use sophia_core::Turn;

/// Where a user is in the conversation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No display name captured yet; the next text becomes the name.
    AwaitingName,
    /// Name known; text is relayed to the completion endpoint.
    Chatting,
}

/// A user's display name and rolling message history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub name: Option<String>,
    pub history: Vec<Turn>,
}

impl Session {
    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.name.is_some() {
            SessionState::Chatting
        } else {
            SessionState::AwaitingName
        }
    }

    /// Append a turn, then drop the oldest entries beyond `capacity`.
    pub(crate) fn push_bounded(&mut self, turn: Turn, capacity: usize) {
        self.history.push(turn);
        let excess = self.history.len().saturating_sub(capacity);
        if excess > 0 {
            self.history.drain(..excess);
        }
    }
}
