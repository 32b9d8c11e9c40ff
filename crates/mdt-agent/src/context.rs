//! Per-request context shared by every agent invoked in one call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a prior conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message.
    System,
    /// User message.
    User,
    /// Assistant message.
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A prior turn supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: MessageRole,
    pub content: String,
}

impl HistoryMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Everything an agent may read while answering one request.
///
/// Built once per orchestration call and passed by reference to every agent
/// invoked in that call. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// Correlates log lines of one call.
    pub request_id: Uuid,

    /// Free text from the user.
    pub user_input: String,

    /// Text supplied by the document provider, possibly empty.
    pub document_context: String,

    /// Prior turns in caller order.
    pub conversation_history: Vec<HistoryMessage>,

    /// When the request was received.
    pub timestamp: DateTime<Utc>,

    /// Names of the agents enabled when the request was received.
    pub enabled_agents: Vec<String>,
}

impl RequestContext {
    /// Create a context for `user_input` with empty document context and history.
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user_input: user_input.into(),
            document_context: String::new(),
            conversation_history: Vec::new(),
            timestamp: Utc::now(),
            enabled_agents: Vec::new(),
        }
    }

    /// Set the document context.
    pub fn with_document_context(mut self, document_context: impl Into<String>) -> Self {
        self.document_context = document_context.into();
        self
    }

    /// Set the prior conversation.
    pub fn with_history(mut self, history: Vec<HistoryMessage>) -> Self {
        self.conversation_history = history;
        self
    }

    /// Set the enabled agent view.
    pub fn with_enabled_agents(mut self, names: Vec<String>) -> Self {
        self.enabled_agents = names;
        self
    }

    /// Document context, or a placeholder when none was supplied.
    pub fn document_context_or_placeholder(&self) -> &str {
        if self.document_context.trim().is_empty() {
            "No document context provided."
        } else {
            &self.document_context
        }
    }
}
