use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use sophia_core::{CompletionClient, CompletionError, SamplingParams, Turn};
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

/// Client for an OpenAI-style `chat/completions` endpoint.
///
/// One request per call, no retries. The whole exchange is bounded by the
/// configured timeout.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    sampling: SamplingParams,
    timeout: Duration,
}

impl ChatCompletionsClient {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        let api_url = api_url.into();
        let model = model.into();
        info!("Creating ChatCompletionsClient: url={api_url}, model={model}");
        Self {
            client: Client::new(),
            api_url,
            api_key: None,
            model,
            sampling: SamplingParams::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bearer credential; an empty key is treated as absent.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn transport_error(&self, e: &reqwest::Error) -> CompletionError {
        if e.is_timeout() {
            CompletionError::Transport(format!(
                "délai dépassé après {}s",
                self.timeout.as_secs()
            ))
        } else {
            CompletionError::Transport(e.to_string())
        }
    }
}

/// Pull `choices[0].message.content` out of a completion response body.
fn extract_content(body: &str) -> Result<String, CompletionError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(format!("invalid JSON: {e}")))?;

    value["choices"][0]["message"]["content"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| {
            CompletionError::MalformedResponse("missing choices[0].message.content".to_string())
        })
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: turns,
            temperature: self.sampling.temperature,
            max_tokens: self.sampling.max_tokens,
            top_p: self.sampling.top_p,
        };

        info!(
            "Sending completion request: model={}, turns={}",
            self.model,
            turns.len()
        );

        let mut builder = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if status != StatusCode::OK {
            warn!("Completion endpoint returned {status}");
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let content = extract_content(&body)?;
        info!("Received completion ({} chars)", content.chars().count());
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
