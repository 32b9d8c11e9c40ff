//! Agent registry handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use mdt_agent::AgentMetadata;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{AgentListQuery, AgentListResponse};

/// GET /api/agents - List enabled agents, or every agent with `?all=true`.
pub async fn list_agents(
    State(state): State<AppState>,
    Query(query): Query<AgentListQuery>,
) -> Result<Json<AgentListResponse>> {
    let agents: Vec<AgentMetadata> = state
        .registry()
        .list()?
        .iter()
        .filter(|d| query.all || d.enabled)
        .filter_map(|d| state.loader().metadata(&d.name))
        .collect();
    let total = agents.len();

    Ok(Json(AgentListResponse { agents, total }))
}

/// GET /api/agents/:name - Get one agent.
pub async fn get_agent(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<AgentMetadata>> {
    state
        .loader()
        .metadata(&name)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("agent not found: {}", name)))
}

/// POST /api/agents/:name/enable - Enable an agent.
pub async fn enable_agent(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<AgentMetadata>> {
    set_enabled(&state, &name, true)
}

/// POST /api/agents/:name/disable - Disable an agent.
pub async fn disable_agent(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<AgentMetadata>> {
    set_enabled(&state, &name, false)
}

fn set_enabled(state: &AppState, name: &str, enabled: bool) -> Result<Json<AgentMetadata>> {
    state.registry().set_enabled(name, enabled)?;
    info!(agent = %name, enabled, "Agent toggled");
    state
        .loader()
        .metadata(name)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("agent not found: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::make_test_state;

    #[tokio::test]
    async fn test_list_agents() {
        let state = make_test_state();
        let response = list_agents(State(state), Query(AgentListQuery::default()))
            .await
            .unwrap();

        assert_eq!(response.total, 3);
        assert!(response.agents.iter().all(|a| a.loadable));
        assert!(response.agents.iter().any(|a| a.is_summary_agent));
    }

    #[tokio::test]
    async fn test_disable_hides_from_default_list() {
        let state = make_test_state();
        let disabled = disable_agent(State(state.clone()), Path("CardiologistAgent".to_string()))
            .await
            .unwrap();
        assert!(!disabled.enabled);

        let enabled_only = list_agents(State(state.clone()), Query(AgentListQuery::default()))
            .await
            .unwrap();
        assert_eq!(enabled_only.total, 2);

        let all = list_agents(State(state), Query(AgentListQuery { all: true }))
            .await
            .unwrap();
        assert_eq!(all.total, 3);
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let state = make_test_state();
        let err = get_agent(State(state.clone()), Path("Nobody".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = enable_agent(State(state), Path("Nobody".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
