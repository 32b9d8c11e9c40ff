//! Builds the orchestrator stack from the environment.

use std::path::Path;
use std::sync::Arc;

use mdt_agent::{AgentFactoryRegistry, AgentLoader, ChatClient, ChatCompletion, ModelConfig};
use mdt_embedding::{EmbeddingGenerator, RetryingEmbedder};
use mdt_orchestrator::{LlmQuestionGenerator, Orchestrator, OrchestratorConfig, SimilarityRouter};
use mdt_registry::RegistryStore;
use tracing::{info, warn};

/// Open the registry file. A missing file is an empty registry.
pub fn open_registry(path: &Path) -> mdt_registry::Result<Arc<RegistryStore>> {
    Ok(Arc::new(RegistryStore::open(path)?))
}

/// Completion client from `OPENAI_API_KEY` / `OPENROUTER_API_KEY`, if either is set.
pub fn completion_client() -> Option<Arc<dyn ChatCompletion>> {
    match ChatClient::from_env() {
        Ok(client) => {
            info!(endpoint = ?client.endpoint(), "Completion provider configured");
            Some(Arc::new(client))
        }
        Err(err) => {
            warn!(error = %err, "No completion provider, LLM-backed agents will not load");
            None
        }
    }
}

/// Agent loader over `store` with every built-in factory.
pub fn agent_loader(store: Arc<RegistryStore>, client: Option<Arc<dyn ChatCompletion>>) -> AgentLoader {
    let factories = AgentFactoryRegistry::with_llm(client, ModelConfig::from_env());
    AgentLoader::new(store, factories)
}

/// Full orchestrator over `store`.
pub fn orchestrator(store: Arc<RegistryStore>) -> Orchestrator {
    let client = completion_client();
    let loader = Arc::new(agent_loader(store, client.clone()));

    let generator = EmbeddingGenerator::from_env();
    info!(provider = generator.provider().name(), "Embedding provider configured");
    let config = OrchestratorConfig::default();
    let embedder = RetryingEmbedder::new(generator, config.embedding_timeout, config.embedding_retry);

    let orchestrator =
        Orchestrator::new(loader, SimilarityRouter::new(Arc::new(embedder))).with_config(config);
    match client {
        Some(client) => orchestrator.with_question_generator(Arc::new(LlmQuestionGenerator::new(
            client,
            ModelConfig::from_env(),
        ))),
        None => orchestrator,
    }
}
