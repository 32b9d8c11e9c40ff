//! Structured orchestration results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown when configuration problems stop a request.
pub const CONFIGURATION_ERROR_MESSAGE: &str = "I'm unable to process your request due to \
configuration issues with the medical specialist agents. Please contact the system \
administrator to resolve these issues.";

/// Shown when no agent was confident enough.
pub const CLARIFICATION_MESSAGE: &str = "I wasn't able to confidently identify which medical \
specialist would be most helpful for your concern. Could you please provide more details \
about your symptoms or health issue?";

/// Attached to answers produced by the generalist fallback.
pub const FALLBACK_MESSAGE: &str =
    "I've provided a general analysis of your question based on the available medical information.";

/// Shown when every selected agent failed.
pub const ALL_AGENTS_FAILED_MESSAGE: &str = "All selected agents failed to process your request";

/// Shown when the request could not be processed for internal reasons.
pub const INTERNAL_ERROR_MESSAGE: &str =
    "An unexpected error occurred while processing your request. Please try again.";

/// Whether one agent succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Success,
    Error,
}

/// Outcome of invoking one agent once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AgentResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: AgentStatus::Success,
            output: Some(output.into()),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: AgentStatus::Error,
            output: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AgentStatus::Success
    }
}

/// What `orchestrate` returns. Serialized with a `status` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrchestrationResult {
    /// The registry is unusable; nothing was routed or executed.
    ConfigurationError {
        message: String,
        configuration_issues: Vec<String>,
        help_message: String,
        available_agents: Vec<String>,
    },

    /// No agent was confident enough and the generalist could not answer.
    ClarificationRequired {
        message: String,
        confidence_score: f32,
        follow_up_questions: Vec<String>,
        available_specialists: Vec<String>,
    },

    /// At least one agent answered and the summary (or fallback) succeeded.
    Success {
        summary: String,
        agent_results: BTreeMap<String, AgentResult>,
        confidence_score: f32,
        routed_agents: Vec<String>,
        fallback_used: bool,
        failed_agents: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Agents answered but the summarizer failed; raw results are returned.
    PartialSuccess {
        agent_results: BTreeMap<String, AgentResult>,
        confidence_score: f32,
        routed_agents: Vec<String>,
        failed_agents: Vec<String>,
        summary_error: String,
    },

    /// Nothing succeeded.
    Error {
        message: String,
        confidence_score: f32,
        failed_agents: Vec<String>,
        agent_results: BTreeMap<String, AgentResult>,
    },
}

impl OrchestrationResult {
    /// The `status` tag value.
    pub fn status(&self) -> &'static str {
        match self {
            Self::ConfigurationError { .. } => "configuration_error",
            Self::ClarificationRequired { .. } => "clarification_required",
            Self::Success { .. } => "success",
            Self::PartialSuccess { .. } => "partial_success",
            Self::Error { .. } => "error",
        }
    }

    /// Text to show the user: the summary, the message, or a note on partial results.
    pub fn display_text(&self) -> String {
        match self {
            Self::Success { summary, .. } => summary.clone(),
            Self::ConfigurationError { message, .. }
            | Self::ClarificationRequired { message, .. }
            | Self::Error { message, .. } => message.clone(),
            Self::PartialSuccess { agent_results, .. } => agent_results
                .iter()
                .filter_map(|(name, r)| r.output.as_ref().map(|o| format!("[{}]\n{}", name, o)))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}
