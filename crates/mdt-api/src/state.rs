//! Application state shared across handlers.

use std::sync::Arc;

use mdt_agent::AgentLoader;
use mdt_orchestrator::Orchestrator;
use mdt_registry::RegistryStore;

use crate::config::ApiConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// The orchestrator serving every request. Owns the ledger.
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(config: ApiConfig, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator,
        }
    }

    /// The orchestrator's agent loader.
    pub fn loader(&self) -> &Arc<AgentLoader> {
        self.orchestrator.loader()
    }

    /// The backing registry.
    pub fn registry(&self) -> &Arc<RegistryStore> {
        self.loader().registry()
    }
}
