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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One message of a conversation, tagged with its speaker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
            top_p: 0.9,
        }
    }
}

/// Failures of a completion call.
///
/// The `Display` output is shown to the chat user verbatim, hence the French.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network failure or timeout before a response was received.
    #[error("Erreur réseau: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("Erreur IA: {status}, {body}")]
    Upstream { status: u16, body: String },

    /// The endpoint answered 2xx but without `choices[0].message.content`.
    #[error("Réponse IA invalide: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the ordered turns and return the generated reply text.
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError>;

    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_serializes_with_lowercase_role() {
        let json = serde_json::to_value(Turn::assistant("Salut !")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "Salut !");

        let json = serde_json::to_value(Turn::system("persona")).unwrap();
        assert_eq!(json["role"], "system");
    }

    #[test]
    fn default_sampling_params() {
        let params = SamplingParams::default();
        assert!((params.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(params.max_tokens, 500);
        assert!((params.top_p - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn upstream_error_carries_status_and_body() {
        let err = CompletionError::Upstream {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Erreur IA: 500, boom");
    }
}
