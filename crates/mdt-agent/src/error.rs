//! Error types for the agent crate.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while constructing or invoking agents.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model invocation failed for a reason a retry will not fix.
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// The completion provider is rate limiting us.
    #[error("completion provider rate limited: {0}")]
    RateLimited(String),

    /// The completion provider returned a non-success status.
    #[error("completion API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// Network failure talking to the completion provider.
    #[error("completion transport error: {0}")]
    Transport(String),

    /// The call did not finish in time.
    #[error("agent call timed out after {0:?}")]
    Timeout(Duration),

    /// Response parsing failed.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// No factory registered under this name.
    #[error("unknown agent factory: {0}")]
    UnknownFactory(String),

    /// A factory rejected its parameters.
    #[error("invalid parameters for factory {factory}: {message}")]
    InvalidParams {
        /// Factory name.
        factory: String,
        /// What was wrong.
        message: String,
    },

    /// The handle does not support the requested role.
    #[error("agent {name} cannot act as {role}")]
    WrongRole {
        /// Agent name.
        name: String,
        /// Requested role.
        role: &'static str,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Registry access failed.
    #[error("registry error: {0}")]
    Registry(#[from] mdt_registry::RegistryError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Whether a retry may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::Transport(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ResponseParse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
