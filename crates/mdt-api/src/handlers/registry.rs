//! Registry maintenance handlers.

use axum::{extract::State, Json};
use mdt_orchestrator::ConfigurationStatus;

use crate::error::Result;
use crate::state::AppState;
use crate::types::ReloadResponse;

/// POST /api/registry/reload - Re-read the registry file.
///
/// A malformed file leaves the previous registry in place and returns 500.
pub async fn reload_registry(State(state): State<AppState>) -> Result<Json<ReloadResponse>> {
    state.loader().reload()?;
    let registry = state.registry();
    Ok(Json(ReloadResponse {
        generation: registry.generation(),
        agents: registry.list()?.len(),
    }))
}

/// GET /api/config/status - Current configuration health.
pub async fn config_status(State(state): State<AppState>) -> Result<Json<ConfigurationStatus>> {
    Ok(Json(state.orchestrator.configuration_status()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::make_test_state;

    #[tokio::test]
    async fn test_reload_bumps_generation() {
        let state = make_test_state();
        let before = state.registry().generation();

        let response = reload_registry(State(state)).await.unwrap();
        assert!(response.generation > before);
        assert_eq!(response.agents, 3);
    }

    #[tokio::test]
    async fn test_config_status_reports_issues() {
        let state = make_test_state();
        state.registry().set_enabled("SummaryAgent", false).unwrap();

        let status = config_status(State(state)).await.unwrap();
        assert!(!status.valid);
        assert_eq!(status.issues, vec!["No summary agent configured"]);
        assert!(status.help_message.is_some());
    }
}
