//! Command handlers for CLI subcommands.

use std::path::Path;
use std::sync::Arc;

use mdt_agent::{AgentLoader, AgentMetadata};
use mdt_api::{ApiConfig, AppState};
use mdt_orchestrator::{check_configuration, OrchestrationRequest, OrchestrationResult};
use mdt_registry::{AgentDescriptor, LoadRef, RegistryStore};
use tracing::{info, warn};

use crate::bootstrap;
use crate::cli::{AgentsCommand, Commands, OutputFormat};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command against the registry at `registry_path`.
pub async fn execute(command: Commands, registry_path: &Path) -> Result<()> {
    let store = bootstrap::open_registry(registry_path)?;

    match command {
        Commands::Ask {
            question,
            document,
            json,
        } => cmd_ask(store, &question, document.as_deref(), json).await,
        Commands::Agents { command } => {
            let loader = bootstrap::agent_loader(store, bootstrap::completion_client());
            execute_agents(command, &loader)
        }
        Commands::Status => {
            let loader = bootstrap::agent_loader(store, bootstrap::completion_client());
            cmd_status(&loader)
        }
        Commands::Serve {
            host,
            port,
            cors_origins,
        } => cmd_serve(store, host, port, cors_origins).await,
    }
}

/// Execute an `agents` subcommand.
pub fn execute_agents(command: AgentsCommand, loader: &AgentLoader) -> Result<()> {
    match command {
        AgentsCommand::List { all, format } => cmd_list(loader, all, format),
        AgentsCommand::Show { name } => cmd_show(loader, &name),
        AgentsCommand::Add {
            name,
            factory,
            description,
            params,
            priority,
            tags,
            summary,
            disabled,
        } => {
            let load = params
                .into_iter()
                .fold(LoadRef::new(factory), |load, (k, v)| load.with_param(k, v));
            let mut descriptor = AgentDescriptor::new(name.as_str(), load, description)
                .with_priority(priority)
                .with_tags(tags)
                .with_enabled(!disabled);
            if summary {
                descriptor = descriptor.as_summary_agent();
            }
            cmd_add(loader.registry(), &name, descriptor)
        }
        AgentsCommand::Update {
            name,
            description,
            priority,
            tags,
            summary,
        } => {
            let updated = loader.registry().update(&name, |d| {
                if let Some(description) = description {
                    d.description = Some(description);
                }
                if let Some(priority) = priority {
                    d.priority = priority;
                }
                if let Some(tags) = tags {
                    d.tags = tags;
                }
                if let Some(summary) = summary {
                    d.is_summary_agent = summary;
                }
            })?;
            info!(agent = %updated.name, "Agent updated");
            println!("Updated agent '{}'", updated.name);
            Ok(())
        }
        AgentsCommand::Remove { name } => {
            loader.registry().remove(&name)?;
            println!("Removed agent '{}'", name);
            Ok(())
        }
        AgentsCommand::Enable { name } => {
            loader.registry().set_enabled(&name, true)?;
            println!("Enabled agent '{}'", name);
            Ok(())
        }
        AgentsCommand::Disable { name } => {
            loader.registry().set_enabled(&name, false)?;
            println!("Disabled agent '{}'", name);
            Ok(())
        }
        AgentsCommand::Validate => cmd_validate(loader),
    }
}

async fn cmd_ask(
    store: Arc<RegistryStore>,
    question: &str,
    document: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut request = OrchestrationRequest::new(question);
    if let Some(path) = document {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        request = request.with_document_context(text);
    }

    let orchestrator = bootstrap::orchestrator(store);
    let result = orchestrator.orchestrate(request).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &OrchestrationResult) {
    println!("{}", result.display_text());

    match result {
        OrchestrationResult::Success {
            routed_agents,
            confidence_score,
            failed_agents,
            message,
            ..
        } => {
            println!();
            if let Some(message) = message {
                println!("{}", message);
            }
            println!(
                "Routed to: {} (confidence {:.2})",
                routed_agents.join(", "),
                confidence_score
            );
            if !failed_agents.is_empty() {
                println!("Failed: {}", failed_agents.join(", "));
            }
        }
        OrchestrationResult::PartialSuccess {
            failed_agents,
            summary_error,
            ..
        } => {
            println!("\nSummary unavailable: {}", summary_error);
            if !failed_agents.is_empty() {
                println!("Failed: {}", failed_agents.join(", "));
            }
        }
        OrchestrationResult::ClarificationRequired {
            follow_up_questions,
            available_specialists,
            ..
        } => {
            println!();
            for question in follow_up_questions {
                println!("  - {}", question);
            }
            println!("\nAvailable specialists: {}", available_specialists.join(", "));
        }
        OrchestrationResult::ConfigurationError { help_message, .. } => {
            println!("\n{}", help_message);
        }
        OrchestrationResult::Error { failed_agents, .. } => {
            if !failed_agents.is_empty() {
                println!("Failed: {}", failed_agents.join(", "));
            }
        }
    }
}

fn cmd_list(loader: &AgentLoader, all: bool, format: OutputFormat) -> Result<()> {
    let agents: Vec<AgentMetadata> = loader
        .registry()
        .list()?
        .iter()
        .filter(|d| all || d.enabled)
        .filter_map(|d| loader.metadata(&d.name))
        .collect();

    match format {
        OutputFormat::Table => {
            if agents.is_empty() {
                println!("No agents found.");
                return Ok(());
            }

            println!(
                "{:<28}  {:<12}  {:<8}  {:<8}  DESCRIPTION",
                "NAME", "FACTORY", "ENABLED", "LOADS"
            );
            println!("{}", "-".repeat(90));
            for agent in &agents {
                let name = if agent.is_summary_agent {
                    format!("{} *", agent.name)
                } else {
                    agent.name.clone()
                };
                println!(
                    "{:<28}  {:<12}  {:<8}  {:<8}  {}",
                    truncate(&name, 28),
                    agent.factory.as_deref().unwrap_or("-"),
                    yes_no(agent.enabled),
                    yes_no(agent.loadable),
                    truncate(&agent.description, 30)
                );
            }
            println!("\n{} agent(s), * = summary agent", agents.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&agents)?);
        }
        OutputFormat::Brief => {
            for agent in &agents {
                println!("{}\t{}", agent.name, agent.description);
            }
        }
    }

    Ok(())
}

fn cmd_show(loader: &AgentLoader, name: &str) -> Result<()> {
    let agent = loader
        .metadata(name)
        .ok_or_else(|| format!("Agent not found: {}", name))?;

    println!("Agent: {}", agent.name);
    println!("  Factory: {}", agent.factory.as_deref().unwrap_or("(missing)"));
    println!("  Description: {}", agent.description);
    println!("  Enabled: {}", yes_no(agent.enabled));
    println!("  Priority: {}", agent.priority);
    if !agent.tags.is_empty() {
        println!("  Tags: {}", agent.tags.join(", "));
    }
    println!("  Summary agent: {}", yes_no(agent.is_summary_agent));
    println!("  Loadable: {}", yes_no(agent.loadable));
    Ok(())
}

fn cmd_add(store: &RegistryStore, name: &str, descriptor: AgentDescriptor) -> Result<()> {
    let missing = descriptor.missing_fields();
    if !missing.is_empty() {
        return Err(format!("Agent '{}' is missing: {}", name, missing.join(", ")).into());
    }
    store.add(name, descriptor)?;
    info!(agent = %name, "Agent registered");
    println!("Added agent '{}'", name);
    Ok(())
}

fn cmd_validate(loader: &AgentLoader) -> Result<()> {
    for descriptor in loader.registry().list()? {
        let status = if !descriptor.enabled {
            "disabled"
        } else if loader.validate(&descriptor.name) {
            "ok"
        } else {
            "FAILED"
        };
        println!("  {:<28}  {}", descriptor.name, status);
    }
    println!();
    cmd_status(loader)
}

fn cmd_status(loader: &AgentLoader) -> Result<()> {
    let status = check_configuration(loader)?;
    match status.help_message {
        None => {
            println!("Configuration is valid");
            if let Some(summary) = &status.summary_agent {
                println!("  Summary agent: {}", summary);
            }
            println!("  Enabled agents: {}", status.enabled_agents.join(", "));
            Ok(())
        }
        Some(help) => {
            println!("{}", help);
            Err(format!("{} configuration issue(s)", status.issues.len()).into())
        }
    }
}

async fn cmd_serve(
    store: Arc<RegistryStore>,
    host: String,
    port: u16,
    cors_origins: Vec<String>,
) -> Result<()> {
    let mut config = ApiConfig::new(host, port);
    if !cors_origins.is_empty() {
        config = config.with_cors_origins(cors_origins);
    }

    let orchestrator = bootstrap::orchestrator(store);
    let status = orchestrator.configuration_status()?;
    if !status.valid {
        warn!(issues = ?status.issues, "Serving with an invalid configuration");
    }

    mdt_api::serve(AppState::new(config, Arc::new(orchestrator))).await?;
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Truncates a string to the given number of characters, adding "..." if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
