//! Core `ChatModel` trait and `ApiChatModel` implementation.
//!
//! `ApiChatModel` calls any OpenAI-compatible `{base_url}/chat/completions`
//! endpoint (DeepSeek, OpenAI, Groq, vLLM, ...).  All connection details come
//! from [`LlmConfig`]; nothing is hardcoded.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::llm::prompt::ChatPrompt;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Failures talking to the upstream model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("LLM endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The response carried no `choices[0].message.content`.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ChatModel trait
// ---------------------------------------------------------------------------

/// Async seam for a single chat completion.
///
/// Implementors must be `Send + Sync` so one instance can be shared by every
/// request handler behind an `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `prompt` and return the completion text exactly as the model
    /// produced it.
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// ApiChatModel
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible chat-completions endpoint.
pub struct ApiChatModel {
    client: reqwest::Client,
    endpoint: String,
    config: LlmConfig,
}

impl ApiChatModel {
    /// Build an `ApiChatModel` from application config.
    ///
    /// The HTTP client carries the overall request timeout from
    /// `config.timeout_secs`.  A default client is used as a last resort if
    /// the builder fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });

        if config.accept_invalid_certs {
            log::warn!("TLS certificate verification is disabled for {}", config.base_url);
        }

        Self {
            client,
            endpoint: chat_completions_url(&config.base_url),
            config: config.clone(),
        }
    }
}

/// `{base_url}/chat/completions` without a doubled slash.
pub fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[async_trait]
impl ChatModel for ApiChatModel {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, LlmError> {
        let mut body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user",   "content": prompt.user   }
            ],
            "stream":      false,
            "temperature": prompt.temperature
        });
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
