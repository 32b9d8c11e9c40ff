//! Error types for embedding operations.

use thiserror::Error;

/// Errors that can occur while computing an embedding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    /// The provider rejected the call because of rate limiting.
    #[error("embedding provider rate limited: {0}")]
    RateLimited(String),

    /// The provider returned a non-success status.
    #[error("embedding API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The request never reached the provider or the connection dropped.
    #[error("embedding transport error: {0}")]
    Transport(String),

    /// The call did not finish within the configured timeout.
    #[error("embedding timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The provider answered with something that is not an embedding.
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    /// Provider misconfiguration (missing key, bad model).
    #[error("embedding configuration error: {0}")]
    Configuration(String),
}

impl EmbeddingError {
    /// Whether a retry may succeed.
    ///
    /// Rate limits, server-side failures, transport errors and timeouts are
    /// transient. Everything else is permanent and must not be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::Transport(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::InvalidResponse(_) | Self::Configuration(_) => false,
        }
    }
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {}", err))
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;
