//! Orchestration engine for MDT.
//!
//! Given a user question, the [`Orchestrator`] checks the agent registry,
//! routes the question to the most similar specialist (or every specialist
//! for a full report), falls back to the generalist or asks for
//! clarification when nothing is confident, runs the selected agents, and
//! merges their answers with the summary agent.
//!
//! # Core Types
//!
//! - [`Orchestrator`]: The per-call state machine
//! - [`SimilarityRouter`]: Embedding-based agent selection
//! - [`ConversationLedger`]: Turns recorded by one orchestrator
//! - [`OrchestrationResult`]: What a call returns, tagged by `status`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mdt_agent::{AgentFactoryRegistry, AgentLoader};
//! use mdt_embedding::create_embedder;
//! use mdt_orchestrator::{OrchestrationRequest, Orchestrator, SimilarityRouter};
//! use mdt_registry::RegistryStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RegistryStore::open("config/agent_registry.json")?);
//! let loader = Arc::new(AgentLoader::new(store, AgentFactoryRegistry::new()));
//! let router = SimilarityRouter::new(Arc::new(create_embedder()));
//! let orchestrator = Orchestrator::new(loader, router);
//!
//! let result = orchestrator
//!     .orchestrate(OrchestrationRequest::new("My TSH came back high"))
//!     .await;
//! println!("{}", result.display_text());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod followup;
pub mod ledger;
pub mod orchestrator;
pub mod result;
pub mod router;
pub mod status;

pub use config::OrchestratorConfig;
pub use error::{OrchestratorError, Result};
pub use followup::{
    follow_up_questions, parse_follow_up_questions, FollowUpParse, LlmQuestionGenerator,
    QuestionGenerator,
};
pub use ledger::{ConversationLedger, ConversationTurn};
pub use orchestrator::{OrchestrationRequest, Orchestrator};
pub use result::{AgentResult, AgentStatus, OrchestrationResult};
pub use router::{
    Candidate, RoutingDecision, RoutingMethod, ScoredAgent, SimilarityRouter,
    GENERALIST_AGENT_NAME,
};
pub use status::{check_configuration, ConfigurationStatus};
