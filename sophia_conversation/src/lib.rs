#![warn(
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

//! Per-user conversation handling for the Soph_IA relay.
//!
//! Each user first gives a display name, then chats. Every chat message is
//! sent to the completion endpoint together with a persona instruction and
//! a short rolling history.
//!
//! # Key Pieces
//! - `SessionStore`: in-memory sessions keyed by user id, bounded history
//! - `build_prompt`: persona + history + new message
//! - `MessageRouter`: the `AwaitingName` / `Chatting` state machine

mod prompt;
mod router;
mod session;
mod store;

pub use prompt::{build_prompt, persona_instruction};
pub use router::{Inbound, MessageRouter, Responder, RouterError, replies};
pub use session::{Session, SessionState};
pub use store::{DEFAULT_MAX_HISTORY, SessionStore};
