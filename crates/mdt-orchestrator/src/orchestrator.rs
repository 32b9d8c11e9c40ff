//! Orchestrator - the per-call state machine.
//!
//! `validate -> route -> {fallback | execute} -> summarize -> respond`.
//! Every call appends exactly one turn to the ledger and always returns an
//! [`OrchestrationResult`], never an error.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use mdt_agent::{AgentError, AgentLoader, HistoryMessage, RequestContext};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, Result};
use crate::followup::{follow_up_questions, QuestionGenerator};
use crate::ledger::{ConversationLedger, ConversationTurn};
use crate::result::{
    AgentResult, OrchestrationResult, ALL_AGENTS_FAILED_MESSAGE, CLARIFICATION_MESSAGE,
    CONFIGURATION_ERROR_MESSAGE, FALLBACK_MESSAGE, INTERNAL_ERROR_MESSAGE,
};
use crate::router::{Candidate, RoutingDecision, SimilarityRouter, GENERALIST_AGENT_NAME};
use crate::status::{check_configuration, ConfigurationStatus};

/// Input of one orchestration call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrchestrationRequest {
    pub user_input: String,
    #[serde(default)]
    pub document_context: String,
    #[serde(default)]
    pub conversation_history: Vec<HistoryMessage>,
}

impl OrchestrationRequest {
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            ..Self::default()
        }
    }

    pub fn with_document_context(mut self, document_context: impl Into<String>) -> Self {
        self.document_context = document_context.into();
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryMessage>) -> Self {
        self.conversation_history = history;
        self
    }
}

/// Outcome of the validate stage.
enum Prepared {
    Misconfigured(ConfigurationStatus),
    Ready {
        context: RequestContext,
        candidates: Vec<Candidate>,
    },
}

/// Routes requests to agents and merges their answers.
pub struct Orchestrator {
    loader: Arc<AgentLoader>,
    router: SimilarityRouter,
    questions: Option<Arc<dyn QuestionGenerator>>,
    ledger: ConversationLedger,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator with its own empty ledger.
    pub fn new(loader: Arc<AgentLoader>, router: SimilarityRouter) -> Self {
        Self {
            loader,
            router,
            questions: None,
            ledger: ConversationLedger::new(),
            config: OrchestratorConfig::default(),
        }
    }

    /// Use `generator` for clarification follow-up questions.
    pub fn with_question_generator(mut self, generator: Arc<dyn QuestionGenerator>) -> Self {
        self.questions = Some(generator);
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn loader(&self) -> &Arc<AgentLoader> {
        &self.loader
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Current configuration health, as checked at the start of every call.
    pub fn configuration_status(&self) -> Result<ConfigurationStatus> {
        check_configuration(&self.loader)
    }

    /// Copy of every turn recorded so far.
    pub fn history(&self) -> Result<Vec<ConversationTurn>> {
        self.ledger.all()
    }

    /// Forget every recorded turn.
    pub fn clear_history(&self) -> Result<()> {
        self.ledger.clear()
    }

    /// Handle one request.
    #[instrument(skip_all, fields(input_len = request.user_input.len()))]
    pub async fn orchestrate(&self, request: OrchestrationRequest) -> OrchestrationResult {
        let this = self;
        let req = &request;
        let prepared = match self.with_retry("validate", move || this.prepare(req)).await {
            Ok(prepared) => prepared,
            Err(err) => {
                error!(error = %err, "Orchestration failed before routing completed");
                self.record(&request.user_input, Vec::new(), 0.0);
                return OrchestrationResult::Error {
                    message: INTERNAL_ERROR_MESSAGE.to_string(),
                    confidence_score: 0.0,
                    failed_agents: Vec::new(),
                    agent_results: BTreeMap::new(),
                };
            }
        };

        let (context, candidates) = match prepared {
            Prepared::Misconfigured(status) => {
                warn!(issues = ?status.issues, "Configuration invalid, refusing to route");
                self.record(&request.user_input, Vec::new(), 0.0);
                return OrchestrationResult::ConfigurationError {
                    message: CONFIGURATION_ERROR_MESSAGE.to_string(),
                    configuration_issues: status.issues,
                    help_message: status.help_message.unwrap_or_default(),
                    available_agents: status.enabled_agents,
                };
            }
            Prepared::Ready { context, candidates } => (context, candidates),
        };

        let decision = self.route(&request.user_input, &candidates).await;

        self.record(&request.user_input, decision.selected.clone(), decision.confidence);
        info!(
            request = %context.request_id,
            selected = ?decision.selected,
            confidence = decision.confidence,
            method = ?decision.method,
            "Routed request"
        );

        let threshold = self.loader.confidence_threshold();
        if decision.selected.is_empty() || decision.confidence < threshold {
            return self.fallback(&context, &candidates, decision.confidence).await;
        }

        self.execute(&context, decision).await
    }

    /// Run `op` under the configured retry policy, retrying transient errors only.
    async fn with_retry<T, F, Fut>(&self, stage: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempt = || {
            let call = op();
            async move {
                call.await.map_err(|err| {
                    if err.is_transient() {
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        };

        backoff::future::retry_notify(
            self.config.retry.backoff(),
            attempt,
            |err: OrchestratorError, wait: Duration| {
                warn!(stage, error = %err, retry_in = ?wait, "Orchestration step failed, retrying");
            },
        )
        .await
    }

    async fn prepare(&self, request: &OrchestrationRequest) -> Result<Prepared> {
        let status = check_configuration(&self.loader)?;
        if !status.valid {
            return Ok(Prepared::Misconfigured(status));
        }

        let summary_name = self.loader.summary_agent_name();
        let candidates: Vec<Candidate> = self
            .loader
            .enabled_agents()?
            .into_iter()
            .filter(|d| !d.is_summary_agent && d.name != summary_name)
            .map(|d| {
                let description = d.description_text().to_string();
                Candidate::new(d.name, description)
            })
            .collect();

        let context = RequestContext::new(request.user_input.clone())
            .with_document_context(request.document_context.clone())
            .with_history(request.conversation_history.clone())
            .with_enabled_agents(status.enabled_agents);

        Ok(Prepared::Ready { context, candidates })
    }

    /// Route with retries. A routing failure that survives them selects nothing.
    async fn route(&self, user_input: &str, candidates: &[Candidate]) -> RoutingDecision {
        let router = &self.router;
        let generalist_threshold = self.loader.generalist_confidence_threshold();
        let attempt = move || async move {
            router
                .try_route(user_input, candidates, generalist_threshold)
                .await
                .map_err(OrchestratorError::from)
        };

        match self.with_retry("route", attempt).await {
            Ok(decision) => decision,
            Err(err) => {
                warn!(error = %err, "Routing failed, no agent selected");
                RoutingDecision::failed()
            }
        }
    }

    /// Answer with the generalist, or ask the user to clarify.
    async fn fallback(
        &self,
        context: &RequestContext,
        candidates: &[Candidate],
        confidence: f32,
    ) -> OrchestrationResult {
        match self.run_agent(GENERALIST_AGENT_NAME, context).await {
            Ok(output) => {
                info!(confidence, "Low confidence, answered by the generalist");
                let mut agent_results = BTreeMap::new();
                agent_results.insert(GENERALIST_AGENT_NAME.to_string(), AgentResult::success(output.clone()));
                OrchestrationResult::Success {
                    summary: output,
                    agent_results,
                    confidence_score: confidence,
                    routed_agents: vec![GENERALIST_AGENT_NAME.to_string()],
                    fallback_used: true,
                    failed_agents: Vec::new(),
                    message: Some(FALLBACK_MESSAGE.to_string()),
                }
            }
            Err(err) => {
                info!(confidence, error = %err, "Generalist unavailable, asking for clarification");
                let specialists: Vec<String> = candidates.iter().map(|c| c.name.clone()).collect();
                let follow_up_questions = follow_up_questions(
                    self.questions.as_deref(),
                    &context.user_input,
                    &specialists,
                    &self.loader.fallback_questions(),
                )
                .await;
                OrchestrationResult::ClarificationRequired {
                    message: CLARIFICATION_MESSAGE.to_string(),
                    confidence_score: confidence,
                    follow_up_questions,
                    available_specialists: specialists,
                }
            }
        }
    }

    /// Run the selected agents, then merge whatever succeeded.
    async fn execute(&self, context: &RequestContext, decision: RoutingDecision) -> OrchestrationResult {
        let RoutingDecision {
            selected,
            confidence,
            ..
        } = decision;

        let outcomes: Vec<(String, mdt_agent::Result<String>)> = if self.config.parallel {
            join_all(selected.iter().map(|name| async move {
                (name.clone(), self.run_agent(name, context).await)
            }))
            .await
        } else {
            let mut outcomes = Vec::with_capacity(selected.len());
            for name in &selected {
                outcomes.push((name.clone(), self.run_agent(name, context).await));
            }
            outcomes
        };

        let mut agent_results = BTreeMap::new();
        let mut successes = BTreeMap::new();
        let mut failed_agents = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(output) => {
                    successes.insert(name.clone(), output.clone());
                    agent_results.insert(name, AgentResult::success(output));
                }
                Err(err) => {
                    warn!(agent = %name, error = %err, "Agent failed");
                    failed_agents.push(name.clone());
                    agent_results.insert(name, AgentResult::failure(err.to_string()));
                }
            }
        }

        if successes.is_empty() {
            error!(failed = ?failed_agents, "Every selected agent failed");
            return OrchestrationResult::Error {
                message: ALL_AGENTS_FAILED_MESSAGE.to_string(),
                confidence_score: confidence,
                failed_agents,
                agent_results,
            };
        }

        match self.summarize(&successes, context).await {
            Ok(summary) => OrchestrationResult::Success {
                summary,
                agent_results,
                confidence_score: confidence,
                routed_agents: selected,
                fallback_used: false,
                failed_agents,
                message: None,
            },
            Err(err) => {
                warn!(error = %err, "Summarization failed, returning raw agent results");
                OrchestrationResult::PartialSuccess {
                    agent_results,
                    confidence_score: confidence,
                    routed_agents: selected,
                    failed_agents,
                    summary_error: err.to_string(),
                }
            }
        }
    }

    /// Resolve and run one responder, bounded by the agent timeout.
    async fn run_agent(&self, name: &str, context: &RequestContext) -> mdt_agent::Result<String> {
        let agent = self.loader.try_resolve(name)?.as_agent()?;
        debug!(agent = %name, request = %context.request_id, "Invoking agent");
        self.bounded(agent.run(context)).await
    }

    async fn summarize(
        &self,
        outputs: &BTreeMap<String, String>,
        context: &RequestContext,
    ) -> mdt_agent::Result<String> {
        let name = self.loader.summary_agent_name();
        let summarizer = self.loader.try_resolve(&name)?.as_summarizer()?;
        self.bounded(summarizer.summarize(outputs, context)).await
    }

    async fn bounded<F>(&self, call: F) -> mdt_agent::Result<String>
    where
        F: Future<Output = mdt_agent::Result<String>>,
    {
        let limit = self.config.agent_timeout;
        tokio::time::timeout(limit, call)
            .await
            .unwrap_or(Err(AgentError::Timeout(limit)))
    }

    fn record(&self, user_input: &str, routed_agents: Vec<String>, confidence: f32) {
        if let Err(err) = self
            .ledger
            .append(ConversationTurn::new(user_input, routed_agents, confidence))
        {
            error!(error = %err, "Could not record conversation turn");
        }
    }
}
