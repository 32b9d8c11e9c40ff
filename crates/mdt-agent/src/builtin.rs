//! Built-in agents.
//!
//! - [`SpecialistAgent`]: one LLM-backed specialist per registry entry
//! - [`GeneralistAgent`]: general questions and low-confidence fallback
//! - [`SummaryAgent`]: merges specialist outputs with the LLM
//! - [`EchoAgent`] and [`ConcatSummarizer`]: deterministic, no network

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::agent::{Agent, Summarizer};
use crate::client::{ChatCompletion, ChatMessage};
use crate::config::ModelConfig;
use crate::context::RequestContext;
use crate::error::Result;
use crate::prompts;

/// Prior turns forwarded to the model.
const HISTORY_WINDOW: usize = 10;

fn conversation(ctx: &RequestContext, system: String, user: String) -> Vec<ChatMessage> {
    let skip = ctx.conversation_history.len().saturating_sub(HISTORY_WINDOW);
    let mut messages = Vec::with_capacity(HISTORY_WINDOW + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(
        ctx.conversation_history
            .iter()
            .skip(skip)
            .map(ChatMessage::from_history),
    );
    messages.push(ChatMessage::user(user));
    messages
}

/// A specialist parameterised by its specialty and focus description.
pub struct SpecialistAgent {
    name: String,
    specialty: String,
    focus: String,
    client: Arc<dyn ChatCompletion>,
    config: ModelConfig,
}

impl SpecialistAgent {
    pub fn new(
        name: impl Into<String>,
        specialty: impl Into<String>,
        focus: impl Into<String>,
        client: Arc<dyn ChatCompletion>,
        config: ModelConfig,
    ) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
            focus: focus.into(),
            client,
            config,
        }
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }
}

#[async_trait]
impl Agent for SpecialistAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &RequestContext) -> Result<String> {
        debug!(agent = %self.name, request = %ctx.request_id, "Running specialist");
        let messages = conversation(
            ctx,
            prompts::specialist_system(&self.specialty, &self.focus),
            prompts::specialist_user(&ctx.user_input, ctx.document_context_or_placeholder()),
        );
        self.client.complete(&self.config, messages).await
    }
}

/// Answers general questions.
pub struct GeneralistAgent {
    name: String,
    client: Arc<dyn ChatCompletion>,
    config: ModelConfig,
}

impl GeneralistAgent {
    pub fn new(name: impl Into<String>, client: Arc<dyn ChatCompletion>, config: ModelConfig) -> Self {
        Self {
            name: name.into(),
            client,
            config,
        }
    }
}

#[async_trait]
impl Agent for GeneralistAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &RequestContext) -> Result<String> {
        let messages = conversation(
            ctx,
            prompts::GENERALIST_SYSTEM.to_string(),
            prompts::generalist_user(&ctx.user_input, ctx.document_context_or_placeholder()),
        );
        self.client.complete(&self.config, messages).await
    }
}

/// LLM-backed merge of specialist outputs.
pub struct SummaryAgent {
    name: String,
    client: Arc<dyn ChatCompletion>,
    config: ModelConfig,
}

impl SummaryAgent {
    pub fn new(name: impl Into<String>, client: Arc<dyn ChatCompletion>, config: ModelConfig) -> Self {
        Self {
            name: name.into(),
            client,
            config,
        }
    }
}

#[async_trait]
impl Summarizer for SummaryAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn summarize(
        &self,
        outputs: &BTreeMap<String, String>,
        ctx: &RequestContext,
    ) -> Result<String> {
        debug!(agent = %self.name, inputs = outputs.len(), "Summarizing specialist outputs");
        let user_input = if ctx.user_input.trim().is_empty() {
            "General health assessment"
        } else {
            &ctx.user_input
        };
        let messages = vec![
            ChatMessage::system(prompts::SUMMARY_SYSTEM),
            ChatMessage::user(prompts::summary_user(
                &prompts::label_outputs(outputs),
                user_input,
            )),
        ];
        self.client.complete(&self.config, messages).await
    }
}

/// Replies with a fixed prefix and the user input.
pub struct EchoAgent {
    name: String,
    prefix: String,
}

impl EchoAgent {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl Agent for EchoAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &RequestContext) -> Result<String> {
        Ok(format!("{}{}", self.prefix, ctx.user_input))
    }
}

/// Joins outputs as labelled blocks.
pub struct ConcatSummarizer {
    name: String,
}

impl ConcatSummarizer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Summarizer for ConcatSummarizer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn summarize(
        &self,
        outputs: &BTreeMap<String, String>,
        _ctx: &RequestContext,
    ) -> Result<String> {
        Ok(prompts::label_outputs(outputs))
    }
}
