//! Typed registry of agent constructors keyed by factory name.
//!
//! A registry entry's `load.factory` selects a constructor here; its
//! `load.params` are handed to the constructor. Unknown factory names resolve
//! to nothing, they never panic.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use mdt_registry::AgentDescriptor;

use crate::agent::AgentHandle;
use crate::builtin::{ConcatSummarizer, EchoAgent, GeneralistAgent, SpecialistAgent, SummaryAgent};
use crate::client::ChatCompletion;
use crate::config::ModelConfig;
use crate::error::{AgentError, Result};
use crate::prompts::specialty_label;

/// LLM-backed specialist. Params: `specialty`, `model`.
pub const SPECIALIST_FACTORY: &str = "specialist";
/// LLM-backed generalist. Params: `model`.
pub const GENERALIST_FACTORY: &str = "generalist";
/// LLM-backed summarizer. Params: `model`.
pub const SUMMARY_FACTORY: &str = "summary";
/// Offline responder. Params: `prefix`.
pub const ECHO_FACTORY: &str = "echo";
/// Offline summarizer that concatenates labelled outputs.
pub const CONCAT_FACTORY: &str = "concat";

/// What a factory receives.
pub struct FactoryInput<'a> {
    /// Registry name of the agent being built.
    pub name: &'a str,
    /// The full registry entry.
    pub descriptor: &'a AgentDescriptor,
    /// `load.params` of the entry.
    pub params: &'a BTreeMap<String, String>,
}

impl FactoryInput<'_> {
    /// A parameter value, if set.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Constructor for one kind of agent.
pub type AgentFactory = Arc<dyn Fn(&FactoryInput<'_>) -> Result<AgentHandle> + Send + Sync>;

/// Registry of agent factories.
///
/// # Example
///
/// ```
/// use mdt_agent::{AgentFactoryRegistry, AgentHandle, EchoAgent};
///
/// let mut factories = AgentFactoryRegistry::new();
/// factories.register("shout", |input| {
///     Ok(AgentHandle::responder(EchoAgent::new(input.name, "!! ")))
/// });
/// assert!(factories.get("shout").is_some());
/// assert!(factories.get("oracle").is_none());
/// ```
#[derive(Clone)]
pub struct AgentFactoryRegistry {
    factories: HashMap<String, AgentFactory>,
}

impl AgentFactoryRegistry {
    /// Registry with the offline built-ins (`echo`, `concat`).
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(ECHO_FACTORY, |input| {
            let prefix = input
                .param("prefix")
                .map(str::to_string)
                .unwrap_or_else(|| format!("[{}] ", input.name));
            Ok(AgentHandle::responder(EchoAgent::new(input.name, prefix)))
        });
        registry.register(CONCAT_FACTORY, |input| {
            Ok(AgentHandle::summarizer(ConcatSummarizer::new(input.name)))
        });
        registry
    }

    /// Registry with no factories.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the offline built-ins plus the LLM-backed ones.
    ///
    /// When `client` is `None` the LLM factories are still registered but
    /// fail to construct, so the affected agents report as unloadable.
    pub fn with_llm(client: Option<Arc<dyn ChatCompletion>>, base: ModelConfig) -> Self {
        let mut registry = Self::new();

        let specialist_client = client.clone();
        let specialist_base = base.clone();
        registry.register(SPECIALIST_FACTORY, move |input| {
            let client = require_client(&specialist_client, input)?;
            let specialty = input
                .param("specialty")
                .map(str::to_string)
                .unwrap_or_else(|| specialty_label(input.name).to_lowercase());
            let config = model_for(input, &specialist_base);
            Ok(AgentHandle::responder(SpecialistAgent::new(
                input.name,
                specialty,
                input.descriptor.description_text(),
                client,
                config,
            )))
        });

        let generalist_client = client.clone();
        let generalist_base = base.clone();
        registry.register(GENERALIST_FACTORY, move |input| {
            let client = require_client(&generalist_client, input)?;
            let config = model_for(input, &generalist_base);
            Ok(AgentHandle::responder(GeneralistAgent::new(input.name, client, config)))
        });

        let summary_base = base.with_temperature(0.3);
        registry.register(SUMMARY_FACTORY, move |input| {
            let client = require_client(&client, input)?;
            let config = model_for(input, &summary_base);
            Ok(AgentHandle::summarizer(SummaryAgent::new(input.name, client, config)))
        });

        registry
    }

    /// Register (or replace) a factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&FactoryInput<'_>) -> Result<AgentHandle> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Get a factory by name.
    pub fn get(&self, name: &str) -> Option<AgentFactory> {
        self.factories.get(name).cloned()
    }

    /// Registered factory names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no factories are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build the agent described by `descriptor`.
    pub fn construct(&self, descriptor: &AgentDescriptor) -> Result<AgentHandle> {
        let load = descriptor.load.as_ref().ok_or_else(|| {
            AgentError::Configuration(format!("agent {} has no load reference", descriptor.name))
        })?;
        let factory = self
            .get(&load.factory)
            .ok_or_else(|| AgentError::UnknownFactory(load.factory.clone()))?;

        factory(&FactoryInput {
            name: &descriptor.name,
            descriptor,
            params: &load.params,
        })
    }
}

impl Default for AgentFactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn require_client(
    client: &Option<Arc<dyn ChatCompletion>>,
    input: &FactoryInput<'_>,
) -> Result<Arc<dyn ChatCompletion>> {
    client.clone().ok_or_else(|| {
        AgentError::Configuration(format!(
            "agent {} needs a completion provider but none is configured",
            input.name
        ))
    })
}

fn model_for(input: &FactoryInput<'_>, base: &ModelConfig) -> ModelConfig {
    match input.param("model") {
        Some(model) => ModelConfig {
            model: model.to_string(),
            ..base.clone()
        },
        None => base.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use async_trait::async_trait;
    use mdt_registry::LoadRef;

    struct FixedClient;

    #[async_trait]
    impl ChatCompletion for FixedClient {
        async fn complete(
            &self,
            config: &ModelConfig,
            _messages: Vec<crate::client::ChatMessage>,
        ) -> Result<String> {
            Ok(format!("answered by {}", config.model))
        }
    }

    fn descriptor(name: &str, load: LoadRef) -> AgentDescriptor {
        AgentDescriptor::new(name, load, "description")
    }

    #[test]
    fn test_new_has_offline_builtins() {
        let registry = AgentFactoryRegistry::new();
        assert_eq!(registry.list(), vec!["concat", "echo"]);
        assert!(!registry.is_empty());
    }

    #[tokio::test]
    async fn test_construct_echo_with_params() {
        let registry = AgentFactoryRegistry::new();
        let handle = registry
            .construct(&descriptor("EchoAgent", LoadRef::new("echo").with_param("prefix", "> ")))
            .unwrap();

        let agent = handle.as_agent().unwrap();
        let output = agent.run(&RequestContext::new("hi")).await.unwrap();
        assert_eq!(output, "> hi");
    }

    #[test]
    fn test_unknown_factory() {
        let registry = AgentFactoryRegistry::new();
        let err = registry
            .construct(&descriptor("X", LoadRef::new("oracle")))
            .unwrap_err();
        assert!(matches!(err, AgentError::UnknownFactory(name) if name == "oracle"));
    }

    #[test]
    fn test_missing_load_reference() {
        let registry = AgentFactoryRegistry::new();
        let mut d = descriptor("X", LoadRef::new("echo"));
        d.load = None;
        assert!(matches!(
            registry.construct(&d),
            Err(AgentError::Configuration(_))
        ));
    }

    #[test]
    fn test_llm_factories_without_client_fail() {
        let registry = AgentFactoryRegistry::with_llm(None, ModelConfig::default());
        assert!(registry.get(SPECIALIST_FACTORY).is_some());
        let err = registry
            .construct(&descriptor("CardiologistAgent", LoadRef::new("specialist")))
            .unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_llm_factories_with_client() {
        let client: Arc<dyn ChatCompletion> = Arc::new(FixedClient);
        let registry = AgentFactoryRegistry::with_llm(Some(client), ModelConfig::new("base"));

        let specialist = registry
            .construct(&descriptor(
                "CardiologistAgent",
                LoadRef::new("specialist").with_param("model", "heart-model"),
            ))
            .unwrap();
        let output = specialist
            .as_agent()
            .unwrap()
            .run(&RequestContext::new("q"))
            .await
            .unwrap();
        assert_eq!(output, "answered by heart-model");

        let summary = registry
            .construct(&descriptor("SummaryAgent", LoadRef::new("summary")))
            .unwrap();
        assert!(summary.is_summarizer());
        assert!(summary.as_agent().is_err());
    }
}
