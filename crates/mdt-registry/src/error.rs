//! Error types for registry operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading, mutating or persisting the registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Failed to read the registry file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the registry file.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry file is not a valid registry document.
    #[error("invalid registry document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No agent registered under this name.
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// An agent with this name is already registered.
    #[error("agent already exists: {0}")]
    AgentExists(String),

    /// A lock was poisoned by a panicking writer.
    #[error("registry lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
