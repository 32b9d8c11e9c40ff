//! Chat completion client for OpenAI-compatible endpoints.

use std::time::Duration;

use async_trait::async_trait;
use mdt_embedding::RetryPolicy;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::ModelConfig;
use crate::context::HistoryMessage;
use crate::error::{AgentError, Result};

/// Environment variable for OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable for OpenRouter API key.
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Anything that can complete a chat conversation.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send `messages` and return the assistant's text.
    async fn complete(&self, config: &ModelConfig, messages: Vec<ChatMessage>) -> Result<String>;
}

/// Which hosted API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEndpoint {
    OpenAI,
    OpenRouter,
}

impl ChatEndpoint {
    fn url(self) -> &'static str {
        match self {
            Self::OpenAI => OPENAI_API_URL,
            Self::OpenRouter => OPENROUTER_API_URL,
        }
    }
}

/// HTTP chat completion client with timeout and bounded retry.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: ChatEndpoint,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ChatClient {
    /// Create a client for `endpoint`.
    pub fn new(endpoint: ChatEndpoint, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a client from environment variables.
    ///
    /// `OPENAI_API_KEY` is preferred over `OPENROUTER_API_KEY`.
    pub fn from_env() -> Result<Self> {
        if let Ok(key) = std::env::var(OPENAI_API_KEY_ENV) {
            return Ok(Self::new(ChatEndpoint::OpenAI, key));
        }
        if let Ok(key) = std::env::var(OPENROUTER_API_KEY_ENV) {
            return Ok(Self::new(ChatEndpoint::OpenRouter, key));
        }
        Err(AgentError::Configuration(format!(
            "Missing {} or {} environment variable",
            OPENAI_API_KEY_ENV, OPENROUTER_API_KEY_ENV
        )))
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy for transient failures.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> ChatEndpoint {
        self.endpoint
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<String> {
        trace!(model = %request.model, messages = request.messages.len(), "Sending chat request");

        let response = self
            .client
            .post(self.endpoint.url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(AgentError::RateLimited(text));
            }
            return Err(AgentError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let response: ChatResponse = response.json().await?;
        debug!(
            tokens = response.usage.as_ref().map_or(0, |u| u.total_tokens),
            "Chat response received"
        );

        response
            .content()
            .map(str::to_string)
            .ok_or_else(|| AgentError::ResponseParse("response has no message content".into()))
    }
}

#[async_trait]
impl ChatCompletion for ChatClient {
    async fn complete(&self, config: &ModelConfig, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: config.model.clone(),
            messages,
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
        };
        let request = &request;
        let limit = self.timeout;

        let attempt = move || async move {
            match tokio::time::timeout(limit, self.send_once(request)).await {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(err)) if err.is_transient() => Err(backoff::Error::transient(err)),
                Ok(Err(err)) => Err(backoff::Error::permanent(err)),
                Err(_) => Err(backoff::Error::transient(AgentError::Timeout(limit))),
            }
        };

        backoff::future::retry_notify(
            self.retry.backoff(),
            attempt,
            |err: AgentError, wait: Duration| {
                warn!(error = %err, retry_in = ?wait, "Completion call failed, retrying");
            },
        )
        .await
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A message in the chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Convert a caller-supplied history entry.
    pub fn from_history(msg: &HistoryMessage) -> Self {
        Self {
            role: msg.role.to_string(),
            content: msg.content.clone(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

impl ChatResponse {
    /// Text of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// A choice in the completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

/// Message in a completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_message_from_history() {
        let msg = ChatMessage::from_history(&HistoryMessage::assistant("earlier answer"));
        assert_eq!(msg.role, "assistant");
        assert_eq!(msg.content, "earlier answer");
    }

    #[test]
    fn test_request_serialization_skips_none() {
        let request = ChatRequest {
            model: "m".into(),
            messages: vec![ChatMessage::user("hi")],
            max_tokens: None,
            temperature: Some(0.3),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("max_tokens").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Your TSH is normal."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();
        assert_eq!(response.content(), Some("Your TSH is normal."));

        let empty: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(empty.content().is_none());
    }
}
