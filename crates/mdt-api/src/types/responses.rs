//! Response DTOs for the API.

use mdt_agent::AgentMetadata;
use mdt_orchestrator::ConversationTurn;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Whether the registry currently passes validation.
    pub configuration_valid: bool,
}

/// Agent list response.
#[derive(Debug, Clone, Serialize)]
pub struct AgentListResponse {
    pub agents: Vec<AgentMetadata>,
    pub total: usize,
}

/// Conversation history response.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub turns: Vec<ConversationTurn>,
    pub total: usize,
}

/// Registry reload response.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadResponse {
    /// Registry generation after the reload.
    pub generation: u64,
    /// Number of registered agents.
    pub agents: usize,
}
