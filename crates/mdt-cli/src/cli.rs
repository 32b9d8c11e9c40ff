//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// MDT - route health questions to specialist agents
#[derive(Parser, Debug)]
#[command(name = "mdt")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the agent registry file
    #[arg(short, long, env = "MDT_REGISTRY_PATH", global = true)]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question and print the orchestrated answer
    Ask {
        /// The question
        #[arg(required = true)]
        question: String,

        /// File whose text is passed to agents as document context
        #[arg(short, long)]
        document: Option<PathBuf>,

        /// Print the full structured result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage registered agents
    Agents {
        #[command(subcommand)]
        command: AgentsCommand,
    },

    /// Check the registry and print remediation steps if invalid
    Status,

    /// Start the HTTP API
    Serve {
        /// Host to bind to
        #[arg(long, env = "MDT_API_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, env = "MDT_API_PORT", default_value_t = 8765)]
        port: u16,

        /// Allowed CORS origin (repeatable, default any)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AgentsCommand {
    /// List agents
    List {
        /// Include disabled agents
        #[arg(short, long)]
        all: bool,

        /// Output format (table, json, brief)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one agent
    Show {
        #[arg(required = true)]
        name: String,
    },

    /// Register a new agent
    Add {
        #[arg(required = true)]
        name: String,

        /// Factory that builds the agent (specialist, generalist, summary, echo, concat)
        #[arg(short, long)]
        factory: String,

        /// Capability description used for routing
        #[arg(short, long)]
        description: String,

        /// Factory parameter as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        #[arg(long, default_value_t = 1)]
        priority: i64,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Mark as the summary agent
        #[arg(long)]
        summary: bool,

        /// Register disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Change fields of an existing agent
    Update {
        #[arg(required = true)]
        name: String,

        /// New capability description
        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        priority: Option<i64>,

        /// Replace tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,

        /// Set or clear the summary agent flag
        #[arg(long)]
        summary: Option<bool>,
    },

    /// Remove an agent
    Remove {
        #[arg(required = true)]
        name: String,
    },

    /// Enable an agent
    Enable {
        #[arg(required = true)]
        name: String,
    },

    /// Disable an agent
    Disable {
        #[arg(required = true)]
        name: String,
    },

    /// Check that every registered agent can be loaded
    Validate,
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Brief,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

impl Cli {
    /// Returns the registry path, using the default lookup if not specified.
    pub fn registry_path(&self) -> PathBuf {
        self.registry
            .clone()
            .unwrap_or_else(mdt_registry::config::registry_file)
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_ask() {
        let cli = Cli::parse_from(["mdt", "ask", "Is my TSH high?", "--json"]);
        match cli.command {
            Commands::Ask { question, json, document } => {
                assert_eq!(question, "Is my TSH high?");
                assert!(json);
                assert!(document.is_none());
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_cli_parse_agents_add() {
        let cli = Cli::parse_from([
            "mdt",
            "agents",
            "add",
            "NeurologistAgent",
            "--factory",
            "specialist",
            "--description",
            "Headaches and seizures",
            "--param",
            "specialty=neurology",
            "--tags",
            "neurology,brain",
        ]);
        match cli.command {
            Commands::Agents {
                command: AgentsCommand::Add { name, params, tags, summary, priority, .. },
            } => {
                assert_eq!(name, "NeurologistAgent");
                assert_eq!(params, vec![("specialty".to_string(), "neurology".to_string())]);
                assert_eq!(tags, vec!["neurology", "brain"]);
                assert!(!summary);
                assert_eq!(priority, 1);
            }
            _ => panic!("Expected Agents Add command"),
        }
    }

    #[test]
    fn test_cli_parse_agents_update() {
        let cli = Cli::parse_from([
            "mdt", "agents", "update", "SummaryAgent", "--summary", "true", "--priority", "0",
        ]);
        match cli.command {
            Commands::Agents {
                command: AgentsCommand::Update { name, summary, priority, description, tags },
            } => {
                assert_eq!(name, "SummaryAgent");
                assert_eq!(summary, Some(true));
                assert_eq!(priority, Some(0));
                assert!(description.is_none());
                assert!(tags.is_none());
            }
            _ => panic!("Expected Agents Update command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_param() {
        let result = Cli::try_parse_from([
            "mdt", "agents", "add", "X", "-f", "echo", "-d", "x", "--param", "novalue",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::parse_from(["mdt", "serve"]);
        match cli.command {
            Commands::Serve { host, port, cors_origins } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8765);
                assert!(cors_origins.is_empty());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_verbose() {
        let cli = Cli::parse_from(["mdt", "status", "-vvv"]);
        assert_eq!(cli.verbose, 3);
        assert_eq!(cli.log_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}
