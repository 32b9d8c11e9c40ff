//! Conversation ledger handlers.

use axum::{extract::State, http::StatusCode, Json};

use crate::error::Result;
use crate::state::AppState;
use crate::types::HistoryResponse;

/// GET /api/history - Every recorded turn, oldest first.
pub async fn get_history(State(state): State<AppState>) -> Result<Json<HistoryResponse>> {
    let turns = state.orchestrator.history()?;
    let total = turns.len();
    Ok(Json(HistoryResponse { turns, total }))
}

/// DELETE /api/history - Forget every recorded turn.
pub async fn clear_history(State(state): State<AppState>) -> Result<StatusCode> {
    state.orchestrator.clear_history()?;
    Ok(StatusCode::NO_CONTENT)
}
