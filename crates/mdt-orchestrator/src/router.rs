//! Similarity router.
//!
//! Scores the user input against each candidate's capability description and
//! picks at most one agent, except for the literal "full report" override
//! which selects every candidate.
//!
//! The generalist is addressed by the fixed name [`GENERALIST_AGENT_NAME`];
//! renaming it in the registry disables the general-question override.

use std::sync::Arc;

use mdt_embedding::{cosine_similarity, Embedder, EmbeddingError};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Registry name the general-question override and the fallback look for.
pub const GENERALIST_AGENT_NAME: &str = "GeneralistAgent";

/// Top score must be strictly above this to select a specialist.
pub const SELECTION_THRESHOLD: f32 = 0.75;

/// General questions only go to the generalist when the top score is below this.
pub const GENERALIST_OVERRIDE_CEILING: f32 = 0.8;

/// Phrases that select every candidate with full confidence.
pub const FULL_REPORT_PHRASES: &[&str] = &["full report", "health summary"];

/// Phrases that mark a general question.
pub const GENERAL_QUESTION_KEYWORDS: &[&str] = &[
    "what does this mean",
    "explain",
    "help me understand",
    "overview",
    "general",
    "what is",
    "tell me about",
    "how do i read",
    "interpret",
    "what are",
    "can you explain",
    "i don't understand",
    "confused",
];

/// An agent the router may select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub description: String,
}

impl Candidate {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A candidate and its similarity to the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredAgent {
    pub name: String,
    pub score: f32,
}

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMethod {
    /// Input asked for a full report.
    LiteralOverride,
    /// Top-scoring candidate cleared the threshold.
    Similarity,
    /// General question routed to the generalist.
    GeneralistOverride,
    /// Nothing cleared the threshold.
    NoMatch,
    /// The input could not be embedded.
    Failed,
}

/// Router output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub selected: Vec<String>,
    pub confidence: f32,
    pub method: RoutingMethod,
    /// Every scored candidate, best first.
    pub ranked: Vec<ScoredAgent>,
}

impl RoutingDecision {
    /// Empty selection for input that could not be routed.
    pub fn failed() -> Self {
        Self {
            selected: Vec::new(),
            confidence: 0.0,
            method: RoutingMethod::Failed,
            ranked: Vec::new(),
        }
    }
}

/// Whether the input asks for a full report.
pub fn is_full_report_request(input: &str) -> bool {
    let lower = input.to_lowercase();
    FULL_REPORT_PHRASES.iter().any(|p| lower.contains(p))
}

/// Whether the input reads as a general question.
pub fn is_general_question(input: &str) -> bool {
    let lower = input.to_lowercase();
    GENERAL_QUESTION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Routes requests by embedding similarity.
#[derive(Clone)]
pub struct SimilarityRouter {
    embedder: Arc<dyn Embedder>,
}

impl SimilarityRouter {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Route `user_input` among `candidates`.
    ///
    /// Never fails: if the input cannot be embedded the decision is empty
    /// with confidence 0.0.
    pub async fn route(
        &self,
        user_input: &str,
        candidates: &[Candidate],
        generalist_threshold: f32,
    ) -> RoutingDecision {
        match self.try_route(user_input, candidates, generalist_threshold).await {
            Ok(decision) => decision,
            Err(err) => {
                warn!(error = %err, "Routing failed, no agent selected");
                RoutingDecision::failed()
            }
        }
    }

    /// Route `user_input`, surfacing a failure to embed the input.
    ///
    /// A candidate whose description cannot be embedded is skipped. A
    /// description vector whose dimension differs from the query's is an
    /// invalid response and fails the whole route.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub async fn try_route(
        &self,
        user_input: &str,
        candidates: &[Candidate],
        generalist_threshold: f32,
    ) -> std::result::Result<RoutingDecision, EmbeddingError> {
        if is_full_report_request(user_input) {
            debug!("Full report requested, selecting every candidate");
            return Ok(RoutingDecision {
                selected: candidates.iter().map(|c| c.name.clone()).collect(),
                confidence: 1.0,
                method: RoutingMethod::LiteralOverride,
                ranked: Vec::new(),
            });
        }

        let query = self.embedder.embed(user_input).await?;

        let mut ranked = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if candidate.description.trim().is_empty() {
                continue;
            }
            match self.embedder.embed(&candidate.description).await {
                Ok(vector) if vector.len() != query.len() => {
                    return Err(EmbeddingError::InvalidResponse(format!(
                        "description of {} embedded to {} dimensions, query to {}",
                        candidate.name,
                        vector.len(),
                        query.len()
                    )));
                }
                Ok(vector) => {
                    let score = cosine_similarity(&query, &vector);
                    let score = if score.is_nan() { 0.0 } else { score };
                    debug!(agent = %candidate.name, score, "Scored candidate");
                    ranked.push(ScoredAgent {
                        name: candidate.name.clone(),
                        score,
                    });
                }
                Err(err) => {
                    warn!(agent = %candidate.name, error = %err, "Could not embed description, skipping");
                }
            }
        }

        // sort_by is stable, ties keep candidate order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(decide(ranked, is_general_question(user_input), generalist_threshold))
    }
}

/// Apply the threshold rules to a ranked list (best first).
pub fn decide(ranked: Vec<ScoredAgent>, general_question: bool, generalist_threshold: f32) -> RoutingDecision {
    let (top_name, top_score) = ranked
        .first()
        .map(|s| (Some(s.name.clone()), s.score))
        .unwrap_or((None, 0.0));

    if general_question && top_score < GENERALIST_OVERRIDE_CEILING {
        let generalist_score = ranked
            .iter()
            .find(|s| s.name == GENERALIST_AGENT_NAME)
            .map_or(0.0, |s| s.score);
        if generalist_score > generalist_threshold {
            return RoutingDecision {
                selected: vec![GENERALIST_AGENT_NAME.to_string()],
                confidence: generalist_score,
                method: RoutingMethod::GeneralistOverride,
                ranked,
            };
        }
    }

    match top_name {
        Some(name) if top_score > SELECTION_THRESHOLD => RoutingDecision {
            selected: vec![name],
            confidence: top_score,
            method: RoutingMethod::Similarity,
            ranked,
        },
        _ => RoutingDecision {
            selected: Vec::new(),
            confidence: top_score,
            method: RoutingMethod::NoMatch,
            ranked,
        },
    }
}
