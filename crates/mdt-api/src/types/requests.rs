//! Request DTOs for the API.

use mdt_agent::HistoryMessage;
use mdt_orchestrator::OrchestrationRequest;
use serde::Deserialize;

/// Ask request.
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    /// The user's question.
    #[serde(alias = "question")]
    pub user_input: String,
    /// Text from the document provider.
    #[serde(default)]
    pub document_context: Option<String>,
    /// Prior turns, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<HistoryMessage>,
}

impl From<AskRequest> for OrchestrationRequest {
    fn from(req: AskRequest) -> Self {
        OrchestrationRequest::new(req.user_input)
            .with_document_context(req.document_context.unwrap_or_default())
            .with_history(req.conversation_history)
    }
}

/// Agent list query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentListQuery {
    /// Include disabled agents.
    #[serde(default)]
    pub all: bool,
}
