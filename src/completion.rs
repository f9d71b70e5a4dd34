//! Chat completion client
//!
//! Sends one system prompt and one user message to an OpenAI-compatible
//! chat-completions endpoint (`OpenRouter` by default) and returns the first
//! choice. Every failure collapses into [`Error::Completion`] so callers can
//! treat them uniformly.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;
use crate::{Error, Result};

/// Produces a reply for a user message
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `user_message` under `system_prompt`
    ///
    /// # Errors
    ///
    /// Returns `Error::Completion` on transport, status, or payload failure
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// HTTP client for a hosted chat-completions API
pub struct ChatCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
}

impl ChatCompletionClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the HTTP client cannot be built
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().to_owned())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config("completion API key required (set OPENROUTER_API_KEY)".to_string())
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: SecretString::from(api_key),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Model identifier sent with each request
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: self.temperature,
        };

        tracing::debug!(model = %self.model, chars = user_message.len(), "requesting completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Completion(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Completion(format!("API error {status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("invalid response body: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Completion("response contained no completion".to_string()))
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let reply = self.request(system_prompt, user_message).await.map_err(|e| {
            tracing::warn!(error = %e, "completion request failed");
            e
        })?;

        tracing::debug!(chars = reply.len(), "completion received");
        Ok(reply)
    }
}
