//! Orchestration handler.

use axum::{extract::State, Json};
use mdt_orchestrator::OrchestrationResult;
use tracing::info;

use crate::state::AppState;
use crate::types::AskRequest;

/// POST /api/ask - Route a question and return the structured result.
///
/// Always answers 200; failures are reported through the result's `status`.
pub async fn ask(State(state): State<AppState>, Json(req): Json<AskRequest>) -> Json<OrchestrationResult> {
    let result = state.orchestrator.orchestrate(req.into()).await;
    info!(status = result.status(), "Answered ask request");
    Json(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::make_test_state;

    #[tokio::test]
    async fn test_ask_full_report() {
        let state = make_test_state();
        let req = AskRequest {
            user_input: "full report".to_string(),
            document_context: None,
            conversation_history: Vec::new(),
        };

        let Json(result) = ask(State(state.clone()), Json(req)).await;
        match result {
            OrchestrationResult::Success { routed_agents, .. } => {
                assert_eq!(routed_agents, vec!["CardiologistAgent", "EndocrinologistAgent"]);
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(state.orchestrator.history().unwrap().len(), 1);
    }
}
