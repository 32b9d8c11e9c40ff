//! Agent traits and the resolved handle type.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::{AgentError, Result};

/// A responder that answers one request.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Registry name of this agent.
    fn name(&self) -> &str;

    /// Produce an answer for the request. Output is opaque text.
    async fn run(&self, ctx: &RequestContext) -> Result<String>;
}

/// Merges the outputs of several responders into one answer.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Registry name of this agent.
    fn name(&self) -> &str;

    /// Merge `outputs` (agent name -> output, successful agents only).
    async fn summarize(
        &self,
        outputs: &BTreeMap<String, String>,
        ctx: &RequestContext,
    ) -> Result<String>;
}

/// A resolved, invocable agent instance.
#[derive(Clone)]
pub enum AgentHandle {
    /// Answers requests.
    Responder(Arc<dyn Agent>),
    /// Merges outputs.
    Summarizer(Arc<dyn Summarizer>),
}

impl AgentHandle {
    /// Wrap a responder.
    pub fn responder(agent: impl Agent + 'static) -> Self {
        Self::Responder(Arc::new(agent))
    }

    /// Wrap a summarizer.
    pub fn summarizer(summarizer: impl Summarizer + 'static) -> Self {
        Self::Summarizer(Arc::new(summarizer))
    }

    /// Registry name.
    pub fn name(&self) -> &str {
        match self {
            Self::Responder(a) => a.name(),
            Self::Summarizer(s) => s.name(),
        }
    }

    /// Whether this handle merges outputs.
    pub fn is_summarizer(&self) -> bool {
        matches!(self, Self::Summarizer(_))
    }

    /// The responder, or an error if this is a summarizer.
    pub fn as_agent(&self) -> Result<Arc<dyn Agent>> {
        match self {
            Self::Responder(a) => Ok(Arc::clone(a)),
            Self::Summarizer(s) => Err(AgentError::WrongRole {
                name: s.name().to_string(),
                role: "responder",
            }),
        }
    }

    /// The summarizer, or an error if this is a responder.
    pub fn as_summarizer(&self) -> Result<Arc<dyn Summarizer>> {
        match self {
            Self::Summarizer(s) => Ok(Arc::clone(s)),
            Self::Responder(a) => Err(AgentError::WrongRole {
                name: a.name().to_string(),
                role: "summarizer",
            }),
        }
    }
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Responder(a) => f.debug_tuple("Responder").field(&a.name()).finish(),
            Self::Summarizer(s) => f.debug_tuple("Summarizer").field(&s.name()).finish(),
        }
    }
}
