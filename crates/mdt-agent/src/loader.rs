//! AgentLoader - resolves registry entries into invocable agents.
//!
//! Resolved handles are cached for the loader's lifetime. The cache is
//! dropped wholesale whenever the registry's generation changes (any upsert
//! or reload), so a handle never outlives the entry it was built from.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use mdt_registry::{AgentDescriptor, RegistrySettings, RegistryStore};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::agent::AgentHandle;
use crate::error::{AgentError, Result};
use crate::factory::AgentFactoryRegistry;

#[derive(Default)]
struct HandleCache {
    generation: u64,
    handles: HashMap<String, AgentHandle>,
}

/// Everything known about one agent, plus whether it can be loaded.
#[derive(Debug, Clone, Serialize)]
pub struct AgentMetadata {
    pub name: String,
    pub factory: Option<String>,
    pub description: String,
    pub enabled: bool,
    pub priority: i64,
    pub tags: Vec<String>,
    pub is_summary_agent: bool,
    /// Required fields present and construction succeeds.
    pub loadable: bool,
}

/// Resolves agents named in the registry.
pub struct AgentLoader {
    registry: Arc<RegistryStore>,
    factories: AgentFactoryRegistry,
    cache: Mutex<HandleCache>,
}

impl AgentLoader {
    /// Create a loader over `registry` using `factories` to build agents.
    pub fn new(registry: Arc<RegistryStore>, factories: AgentFactoryRegistry) -> Self {
        let generation = registry.generation();
        Self {
            registry,
            factories,
            cache: Mutex::new(HandleCache {
                generation,
                handles: HashMap::new(),
            }),
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<RegistryStore> {
        &self.registry
    }

    /// The factory registry.
    pub fn factories(&self) -> &AgentFactoryRegistry {
        &self.factories
    }

    /// All enabled agents in enumeration order.
    pub fn enabled_agents(&self) -> Result<Vec<AgentDescriptor>> {
        let doc = self.registry.snapshot()?;
        Ok(doc.enabled().cloned().collect())
    }

    /// Resolve `name` to a handle.
    ///
    /// Returns `None` (and logs a warning) when the agent is unknown,
    /// disabled, missing required fields, or its factory fails.
    pub fn resolve(&self, name: &str) -> Option<AgentHandle> {
        match self.try_resolve(name) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(agent = %name, error = %err, "Could not resolve agent");
                None
            }
        }
    }

    /// Resolve `name`, reporting why it failed.
    pub fn try_resolve(&self, name: &str) -> Result<AgentHandle> {
        let generation = self.registry.generation();
        {
            let mut cache = self.lock_cache()?;
            if cache.generation != generation {
                debug!(from = cache.generation, to = generation, "Registry changed, dropping cached agents");
                cache.handles.clear();
                cache.generation = generation;
            }
            if let Some(handle) = cache.handles.get(name) {
                return Ok(handle.clone());
            }
        }

        let descriptor = self
            .registry
            .get(name)?
            .ok_or_else(|| AgentError::Configuration(format!("agent {} is not registered", name)))?;
        if !descriptor.enabled {
            return Err(AgentError::Configuration(format!("agent {} is disabled", name)));
        }
        let missing = descriptor.missing_fields();
        if !missing.is_empty() {
            return Err(AgentError::Configuration(format!(
                "agent {} is missing required fields: {}",
                name,
                missing.join(", ")
            )));
        }

        let handle = self.factories.construct(&descriptor)?;

        let mut cache = self.lock_cache()?;
        // A concurrent reload may have bumped the generation while we built
        // the handle; only cache it if it still matches.
        if cache.generation == self.registry.generation() {
            let entry = cache
                .handles
                .entry(name.to_string())
                .or_insert_with(|| handle.clone());
            debug!(agent = %name, "Resolved agent");
            return Ok(entry.clone());
        }
        Ok(handle)
    }

    /// Capability description, empty if the agent is unknown.
    pub fn description(&self, name: &str) -> String {
        self.descriptor(name)
            .map(|d| d.description_text().to_string())
            .unwrap_or_default()
    }

    /// Tags, empty if the agent is unknown.
    pub fn tags(&self, name: &str) -> Vec<String> {
        self.descriptor(name).map(|d| d.tags).unwrap_or_default()
    }

    /// Name of the agent that merges outputs.
    pub fn summary_agent_name(&self) -> String {
        self.settings().summary_agent_name
    }

    /// Similarity needed to accept a routing decision.
    pub fn confidence_threshold(&self) -> f32 {
        self.settings().default_confidence_threshold
    }

    /// Similarity needed to route a general question to the generalist.
    pub fn generalist_confidence_threshold(&self) -> f32 {
        self.settings().generalist_confidence_threshold
    }

    /// Questions offered when follow-up generation fails.
    pub fn fallback_questions(&self) -> Vec<String> {
        self.settings().fallback_questions
    }

    /// Required fields present and the agent resolves.
    pub fn validate(&self, name: &str) -> bool {
        match self.descriptor(name) {
            Some(d) if d.missing_fields().is_empty() => self.resolve(name).is_some(),
            Some(d) => {
                warn!(agent = %name, missing = ?d.missing_fields(), "Agent is missing required fields");
                false
            }
            None => false,
        }
    }

    /// Metadata for one agent.
    pub fn metadata(&self, name: &str) -> Option<AgentMetadata> {
        let d = self.descriptor(name)?;
        let loadable = self.validate(name);
        Some(AgentMetadata {
            name: d.name.clone(),
            factory: d.load.as_ref().map(|l| l.factory.clone()),
            description: d.description_text().to_string(),
            enabled: d.enabled,
            priority: d.priority,
            tags: d.tags.clone(),
            is_summary_agent: d.is_summary_agent,
            loadable,
        })
    }

    /// Re-read the registry file and drop every cached handle.
    pub fn reload(&self) -> Result<()> {
        self.registry.reload()?;
        let mut cache = self.lock_cache()?;
        cache.handles.clear();
        cache.generation = self.registry.generation();
        info!("Agent registry reloaded, cache cleared");
        Ok(())
    }

    fn descriptor(&self, name: &str) -> Option<AgentDescriptor> {
        match self.registry.get(name) {
            Ok(d) => d,
            Err(err) => {
                error!(agent = %name, error = %err, "Registry read failed");
                None
            }
        }
    }

    fn settings(&self) -> RegistrySettings {
        self.registry.settings().unwrap_or_else(|err| {
            error!(error = %err, "Registry read failed, using default settings");
            RegistrySettings::default()
        })
    }

    fn lock_cache(&self) -> Result<std::sync::MutexGuard<'_, HandleCache>> {
        self.cache
            .lock()
            .map_err(|e| AgentError::Internal(format!("agent cache lock poisoned: {}", e)))
    }
}
