//! Text embeddings and similarity scoring for MDT.
//!
//! The router compares a query embedding against each agent's capability
//! description. This crate provides the [`Embedder`] contract, an HTTP-backed
//! [`EmbeddingGenerator`], [`cosine_similarity`], and a [`RetryingEmbedder`]
//! that bounds every call with a timeout and a fixed number of attempts.
//!
//! # Embedding Providers
//!
//! 1. **OpenAI** (set `OPENAI_API_KEY`): Uses `text-embedding-3-small`
//! 2. **OpenRouter** (set `OPENROUTER_API_KEY`): Uses `openai/text-embedding-3-small`
//! 3. **Hash-based** (no API key): Deterministic vectors for offline use
//!
//! `MDT_EMBEDDING_MODEL` overrides the model for either remote provider.

pub mod embedding;
pub mod error;
pub mod retry;

pub use embedding::{cosine_similarity, Embedder, EmbeddingGenerator, EmbeddingProvider};
pub use error::{EmbeddingError, Result};
pub use retry::{FixedRetries, RetryPolicy, RetryingEmbedder};

/// Create an embedding generator from environment.
///
/// Checks for API keys in order: OPENAI_API_KEY, OPENROUTER_API_KEY.
/// Falls back to hash-based embeddings if no key is found.
pub fn create_embedder() -> EmbeddingGenerator {
    EmbeddingGenerator::from_env()
}
