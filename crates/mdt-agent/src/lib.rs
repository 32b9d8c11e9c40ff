//! Agents for the MDT orchestration engine.
//!
//! An agent is either a responder ([`Agent`]) that answers a request, or a
//! [`Summarizer`] that merges several responders' outputs. Agents are not
//! compiled into the orchestrator: the registry names a factory for each
//! one, and the [`AgentLoader`] builds and caches them on demand.
//!
//! # Core Types
//!
//! - [`RequestContext`]: Shared, read-only input of one orchestration call
//! - [`AgentHandle`]: A resolved responder or summarizer
//! - [`AgentFactoryRegistry`]: Factory name -> constructor
//! - [`AgentLoader`]: Registry-backed resolver with a handle cache
//! - [`ChatClient`]: OpenAI-compatible completion client used by the
//!   built-in agents

pub mod agent;
pub mod builtin;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod loader;
pub mod prompts;

pub use agent::{Agent, AgentHandle, Summarizer};
pub use builtin::{ConcatSummarizer, EchoAgent, GeneralistAgent, SpecialistAgent, SummaryAgent};
pub use client::{ChatClient, ChatCompletion, ChatEndpoint, ChatMessage};
pub use config::ModelConfig;
pub use context::{HistoryMessage, MessageRole, RequestContext};
pub use error::{AgentError, Result};
pub use factory::{AgentFactory, AgentFactoryRegistry, FactoryInput};
pub use loader::{AgentLoader, AgentMetadata};
