//! Registry document types.
//!
//! The registry file has two sections:
//!
//! ```json
//! {
//!   "agents": {
//!     "CardiologistAgent": {
//!       "load": {"factory": "specialist", "params": {"specialty": "cardiology"}},
//!       "description": "Heart and blood vessel conditions",
//!       "enabled": true,
//!       "priority": 1,
//!       "tags": ["cardiology"],
//!       "is_summary_agent": false
//!     }
//!   },
//!   "settings": {"summary_agent_name": "SummaryAgent"}
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default name of the agent that merges specialist outputs.
pub const DEFAULT_SUMMARY_AGENT_NAME: &str = "SummaryAgent";

/// Default similarity needed to accept a routing decision.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.75;

/// Default similarity needed to route a general question to the generalist.
pub const DEFAULT_GENERALIST_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Coordinates used to construct an agent implementation.
///
/// `factory` names a constructor registered in the agent factory registry;
/// `params` are handed to it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRef {
    /// Registered factory name.
    pub factory: String,

    /// Factory-specific parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl LoadRef {
    /// Reference a factory with no parameters.
    pub fn new(factory: impl Into<String>) -> Self {
        Self {
            factory: factory.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// One registered agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Unique key. Filled from the map key, never serialized inside the entry.
    #[serde(skip)]
    pub name: String,

    /// How to construct the agent. Required for a valid entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadRef>,

    /// Capability description used as the similarity target. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Informational only, routing does not use it.
    #[serde(default = "default_priority")]
    pub priority: i64,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub is_summary_agent: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i64 {
    1
}

impl AgentDescriptor {
    /// Create an enabled descriptor.
    pub fn new(name: impl Into<String>, load: LoadRef, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            load: Some(load),
            description: Some(description.into()),
            enabled: true,
            priority: default_priority(),
            tags: Vec::new(),
            is_summary_agent: false,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Mark as the summary agent.
    pub fn as_summary_agent(mut self) -> Self {
        self.is_summary_agent = true;
        self
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Capability description, empty when absent.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Names of required fields that are missing or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match &self.load {
            None => missing.push("load"),
            Some(load) if load.factory.trim().is_empty() => missing.push("load.factory"),
            Some(_) => {}
        }
        if self.description_text().trim().is_empty() {
            missing.push("description");
        }
        missing
    }
}

/// Global settings section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySettings {
    #[serde(default = "default_summary_agent_name")]
    pub summary_agent_name: String,

    #[serde(default = "default_confidence_threshold")]
    pub default_confidence_threshold: f32,

    #[serde(default = "default_generalist_confidence_threshold")]
    pub generalist_confidence_threshold: f32,

    /// Questions offered when follow-up generation fails.
    #[serde(default = "default_fallback_questions")]
    pub fallback_questions: Vec<String>,
}

fn default_summary_agent_name() -> String {
    DEFAULT_SUMMARY_AGENT_NAME.to_string()
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_generalist_confidence_threshold() -> f32 {
    DEFAULT_GENERALIST_CONFIDENCE_THRESHOLD
}

fn default_fallback_questions() -> Vec<String> {
    vec![
        "What specific symptoms are you experiencing?".to_string(),
        "Do you have any recent test results or lab work?".to_string(),
        "Which part of your health are you most concerned about?".to_string(),
    ]
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            summary_agent_name: default_summary_agent_name(),
            default_confidence_threshold: default_confidence_threshold(),
            generalist_confidence_threshold: default_generalist_confidence_threshold(),
            fallback_questions: default_fallback_questions(),
        }
    }
}

/// The whole registry file.
///
/// Agents are kept in a sorted map, so enumeration order is the key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub agents: BTreeMap<String, AgentDescriptor>,

    #[serde(default)]
    pub settings: RegistrySettings,
}

impl RegistryDocument {
    /// Parse a document and fill in descriptor names from their keys.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut doc: Self = serde_json::from_str(json)?;
        doc.normalize();
        Ok(doc)
    }

    /// Copy every map key into its descriptor's `name`.
    pub fn normalize(&mut self) {
        for (name, descriptor) in self.agents.iter_mut() {
            descriptor.name = name.clone();
        }
    }

    /// Insert or replace an agent under `name`.
    pub fn insert(&mut self, name: &str, mut descriptor: AgentDescriptor) {
        descriptor.name = name.to_string();
        self.agents.insert(name.to_string(), descriptor);
    }

    /// Enabled agents in enumeration order.
    pub fn enabled(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.agents.values().filter(|a| a.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_on_parse() {
        let doc = RegistryDocument::from_json(
            r#"{"agents": {"CardiologistAgent": {
                "load": {"factory": "specialist"},
                "description": "heart"
            }}}"#,
        )
        .unwrap();

        let agent = &doc.agents["CardiologistAgent"];
        assert_eq!(agent.name, "CardiologistAgent");
        assert!(agent.enabled);
        assert_eq!(agent.priority, 1);
        assert!(agent.tags.is_empty());
        assert!(!agent.is_summary_agent);

        assert_eq!(doc.settings.summary_agent_name, "SummaryAgent");
        assert_eq!(doc.settings.default_confidence_threshold, 0.75);
        assert_eq!(doc.settings.generalist_confidence_threshold, 0.3);
        assert_eq!(doc.settings.fallback_questions.len(), 3);
    }

    #[test]
    fn test_missing_fields() {
        let mut agent = AgentDescriptor::new("A", LoadRef::new("specialist"), "desc");
        assert!(agent.missing_fields().is_empty());

        agent.description = Some("   ".into());
        agent.load = None;
        assert_eq!(agent.missing_fields(), vec!["load", "description"]);
    }

    #[test]
    fn test_name_not_serialized() {
        let agent = AgentDescriptor::new("A", LoadRef::new("echo"), "desc");
        let json = serde_json::to_value(&agent).unwrap();
        assert!(json.get("name").is_none());
        assert_eq!(json["load"]["factory"], "echo");
    }

    #[test]
    fn test_enabled_iteration_order() {
        let mut doc = RegistryDocument::default();
        doc.insert("Zeta", AgentDescriptor::new("", LoadRef::new("echo"), "z"));
        doc.insert("Alpha", AgentDescriptor::new("", LoadRef::new("echo"), "a"));
        doc.insert(
            "Mid",
            AgentDescriptor::new("", LoadRef::new("echo"), "m").with_enabled(false),
        );

        let names: Vec<_> = doc.enabled().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }
}
