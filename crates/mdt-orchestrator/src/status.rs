//! Configuration checks run before every orchestration call.

use mdt_agent::AgentLoader;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;

/// Result of checking the registry for a usable configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationStatus {
    pub valid: bool,
    pub issues: Vec<String>,
    /// Enabled agents in enumeration order.
    pub enabled_agents: Vec<String>,
    /// The flagged summary agent, when there is exactly one.
    pub summary_agent: Option<String>,
    /// Remediation text, absent when valid.
    pub help_message: Option<String>,
}

/// Check that there is at least one enabled agent, exactly one enabled
/// summary agent that is a summarizer named by the settings, and that every
/// enabled agent can be constructed.
pub fn check_configuration(loader: &AgentLoader) -> Result<ConfigurationStatus> {
    let enabled = loader.enabled_agents()?;
    let mut issues = Vec::new();

    if enabled.is_empty() {
        issues.push("No enabled agents found in configuration".to_string());
    }

    let summary_agents: Vec<&str> = enabled
        .iter()
        .filter(|d| d.is_summary_agent)
        .map(|d| d.name.as_str())
        .collect();
    match summary_agents.as_slice() {
        [] => issues.push("No summary agent configured".to_string()),
        [only] => {
            let configured = loader.summary_agent_name();
            if *only != configured {
                warn!(
                    flagged = %only,
                    configured = %configured,
                    "Flagged summary agent differs from settings.summary_agent_name"
                );
                issues.push(format!(
                    "Summary agent {} does not match configured summary agent name {}",
                    only, configured
                ));
            }
            // unloadable agents are reported below
            if let Some(handle) = loader.resolve(only) {
                if !handle.is_summarizer() {
                    issues.push(format!("Summary agent {} is not a summarizer", only));
                }
            }
        }
        many => issues.push(format!("Multiple summary agents found: [{}]", many.join(", "))),
    }

    let failed: Vec<&str> = enabled
        .iter()
        .filter(|d| !loader.validate(&d.name))
        .map(|d| d.name.as_str())
        .collect();
    if !failed.is_empty() {
        issues.push(format!("Failed to load agents: {}", failed.join(", ")));
    }

    let enabled_agents: Vec<String> = enabled.iter().map(|d| d.name.clone()).collect();
    let summary_agent = match summary_agents.as_slice() {
        [only] => Some(only.to_string()),
        _ => None,
    };
    let valid = issues.is_empty();
    let help_message = (!valid).then(|| help_message(&issues, &enabled_agents));

    Ok(ConfigurationStatus {
        valid,
        issues,
        enabled_agents,
        summary_agent,
        help_message,
    })
}

/// Human-readable remediation steps for `issues`.
pub fn help_message(issues: &[String], enabled_agents: &[String]) -> String {
    let mut message = String::from("Configuration issues detected:\n\n");
    for issue in issues {
        message.push_str(&format!("- {}\n", issue));
    }

    message.push_str("\nTo fix these issues:\n");
    message.push_str("1. Add agents: mdt agents add <name> --factory <factory> --description <text>\n");
    message.push_str("2. Enable agents: mdt agents enable <name>\n");
    message.push_str("3. Set a summary agent: mdt agents add <name> --factory summary --summary\n");
    message.push_str("4. Validate configuration: mdt agents validate\n\n");

    if enabled_agents.is_empty() {
        message.push_str("No agents are currently enabled.\n");
    } else {
        message.push_str(&format!(
            "Currently enabled agents: {}\n",
            enabled_agents.join(", ")
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdt_agent::AgentFactoryRegistry;
    use mdt_registry::{AgentDescriptor, LoadRef, RegistryDocument, RegistryStore};
    use std::sync::Arc;

    fn loader(entries: Vec<(&str, AgentDescriptor)>) -> AgentLoader {
        let mut doc = RegistryDocument::default();
        for (name, d) in entries {
            doc.insert(name, d);
        }
        AgentLoader::new(
            Arc::new(RegistryStore::in_memory(doc)),
            AgentFactoryRegistry::new(),
        )
    }

    fn echo(description: &str) -> AgentDescriptor {
        AgentDescriptor::new("", LoadRef::new("echo"), description)
    }

    fn summary() -> AgentDescriptor {
        AgentDescriptor::new("", LoadRef::new("concat"), "merge").as_summary_agent()
    }

    #[test]
    fn test_valid_configuration() {
        let status = check_configuration(&loader(vec![
            ("CardiologistAgent", echo("heart")),
            ("SummaryAgent", summary()),
        ]))
        .unwrap();

        assert!(status.valid);
        assert!(status.issues.is_empty());
        assert_eq!(status.summary_agent.as_deref(), Some("SummaryAgent"));
        assert!(status.help_message.is_none());
    }

    #[test]
    fn test_empty_registry() {
        let status = check_configuration(&loader(vec![])).unwrap();
        assert!(!status.valid);
        assert_eq!(
            status.issues,
            vec!["No enabled agents found in configuration", "No summary agent configured"]
        );
        assert!(status
            .help_message
            .unwrap()
            .contains("No agents are currently enabled."));
    }

    #[test]
    fn test_multiple_summary_agents() {
        let status = check_configuration(&loader(vec![
            ("A", summary()),
            ("B", summary()),
        ]))
        .unwrap();
        assert_eq!(status.issues, vec!["Multiple summary agents found: [A, B]"]);
        assert!(status.summary_agent.is_none());
    }

    #[test]
    fn test_disabled_summary_agent_does_not_count() {
        let status = check_configuration(&loader(vec![
            ("A", echo("a")),
            ("SummaryAgent", summary().with_enabled(false)),
        ]))
        .unwrap();
        assert_eq!(status.issues, vec!["No summary agent configured"]);
    }

    #[test]
    fn test_summary_agent_must_summarize() {
        let status = check_configuration(&loader(vec![
            ("A", echo("a")),
            ("SummaryAgent", echo("merge").as_summary_agent()),
        ]))
        .unwrap();
        assert!(!status.valid);
        assert_eq!(status.issues, vec!["Summary agent SummaryAgent is not a summarizer"]);
    }

    #[test]
    fn test_summary_agent_name_mismatch() {
        let status = check_configuration(&loader(vec![
            ("A", echo("a")),
            ("Merger", summary()),
        ]))
        .unwrap();
        assert!(!status.valid);
        assert_eq!(
            status.issues,
            vec!["Summary agent Merger does not match configured summary agent name SummaryAgent"]
        );
        assert_eq!(status.summary_agent.as_deref(), Some("Merger"));
    }

    #[test]
    fn test_unloadable_agents_reported() {
        let status = check_configuration(&loader(vec![
            ("Broken", AgentDescriptor::new("", LoadRef::new("oracle"), "x")),
            ("SummaryAgent", summary()),
        ]))
        .unwrap();
        assert_eq!(status.issues, vec!["Failed to load agents: Broken"]);
        assert!(status
            .help_message
            .unwrap()
            .contains("Currently enabled agents: Broken, SummaryAgent"));
    }
}
