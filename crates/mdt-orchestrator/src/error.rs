//! Error types for the orchestrator.
//!
//! These never reach the caller of `orchestrate`; they drive the top-level
//! retry and are then folded into a structured result.

use thiserror::Error;

/// Orchestrator-specific errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Agent error.
    #[error("Agent error: {0}")]
    Agent(#[from] mdt_agent::AgentError),

    /// Registry error.
    #[error("Registry error: {0}")]
    Registry(#[from] mdt_registry::RegistryError),

    /// Embedding error.
    #[error("Embedding error: {0}")]
    Embedding(#[from] mdt_embedding::EmbeddingError),

    /// A lock was poisoned by a panicking holder.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl OrchestratorError {
    /// Whether repeating the failed step may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Agent(e) => e.is_transient(),
            Self::Embedding(e) => e.is_transient(),
            Self::Registry(mdt_registry::RegistryError::ReadError { .. }) => true,
            Self::Registry(_) | Self::LockPoisoned(_) => false,
        }
    }
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
