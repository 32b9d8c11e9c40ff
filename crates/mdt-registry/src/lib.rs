//! Persisted agent registry for MDT.
//!
//! The registry maps agent names to [`AgentDescriptor`]s (load coordinates,
//! capability description, enabled flag, priority, tags, summary marker) and
//! carries global [`RegistrySettings`] such as the summary agent name and the
//! routing thresholds. [`RegistryStore`] is safe to share between threads and
//! persists changes with an atomic file replace.

pub mod atomic;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod store;

pub use descriptor::{
    AgentDescriptor, LoadRef, RegistryDocument, RegistrySettings, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_GENERALIST_CONFIDENCE_THRESHOLD, DEFAULT_SUMMARY_AGENT_NAME,
};
pub use error::{RegistryError, Result};
pub use store::RegistryStore;
