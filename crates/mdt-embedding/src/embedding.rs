//! Embedding providers.
//!
//! Real embeddings come from an OpenAI-compatible `/embeddings` endpoint.
//! When no API key is configured a deterministic hash-based embedding is used
//! so the router still works offline (scores are then not semantic).

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{EmbeddingError, Result};

/// Environment variable for OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable for OpenRouter API key (fallback).
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Environment variable overriding the embedding model.
pub const EMBEDDING_MODEL_ENV: &str = "MDT_EMBEDDING_MODEL";

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Dimension used by the hash-based fallback.
pub const DEFAULT_HASH_DIMENSION: usize = 256;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/embeddings";
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/embeddings";

/// Anything that can turn text into a vector.
///
/// The router only depends on this contract, so tests and alternative
/// providers plug in here.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Embedding provider configuration.
#[derive(Debug, Clone)]
pub enum EmbeddingProvider {
    /// Use OpenAI API directly.
    OpenAI { api_key: String, model: String },
    /// Use OpenRouter API.
    OpenRouter { api_key: String, model: String },
    /// Deterministic hash-based vectors, no network.
    HashBased { dimension: usize },
}

impl EmbeddingProvider {
    /// Create provider from environment variables.
    ///
    /// Priority:
    /// 1. OPENAI_API_KEY -> OpenAI
    /// 2. OPENROUTER_API_KEY -> OpenRouter
    /// 3. None -> HashBased fallback
    pub fn from_env() -> Self {
        let model = std::env::var(EMBEDDING_MODEL_ENV).ok();

        if let Ok(api_key) = std::env::var(OPENAI_API_KEY_ENV) {
            debug!("Using OpenAI embedding provider");
            return Self::OpenAI {
                api_key,
                model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            };
        }

        if let Ok(api_key) = std::env::var(OPENROUTER_API_KEY_ENV) {
            debug!("Using OpenRouter embedding provider");
            return Self::OpenRouter {
                api_key,
                model: model.unwrap_or_else(|| format!("openai/{}", DEFAULT_MODEL)),
            };
        }

        warn!("No embedding API key found, using hash-based fallback");
        Self::HashBased {
            dimension: DEFAULT_HASH_DIMENSION,
        }
    }

    /// Check if this provider uses real embeddings (API-based).
    pub fn is_real(&self) -> bool {
        !matches!(self, Self::HashBased { .. })
    }

    /// Short provider name for logs and status output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI { .. } => "openai",
            Self::OpenRouter { .. } => "openrouter",
            Self::HashBased { .. } => "hash",
        }
    }
}

/// Generate embeddings for text content.
#[derive(Clone)]
pub struct EmbeddingGenerator {
    provider: EmbeddingProvider,
    client: reqwest::Client,
}

impl EmbeddingGenerator {
    /// Create a new embedding generator with the given provider.
    pub fn new(provider: EmbeddingProvider) -> Self {
        Self {
            provider,
            client: reqwest::Client::new(),
        }
    }

    /// Create a generator from environment variables.
    pub fn from_env() -> Self {
        Self::new(EmbeddingProvider::from_env())
    }

    /// The configured provider.
    pub fn provider(&self) -> &EmbeddingProvider {
        &self.provider
    }

    /// Check if using real embeddings (not hash-based).
    pub fn is_real(&self) -> bool {
        self.provider.is_real()
    }

    async fn embed_remote(&self, url: &str, api_key: &str, model: &str, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "model": model,
                "input": text
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(EmbeddingError::RateLimited(body));
            }
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let json: serde_json::Value = response.json().await?;
        parse_embedding_response(&json)
    }
}

#[async_trait]
impl Embedder for EmbeddingGenerator {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match &self.provider {
            EmbeddingProvider::OpenAI { api_key, model } => {
                self.embed_remote(OPENAI_API_URL, api_key, model, text).await
            }
            EmbeddingProvider::OpenRouter { api_key, model } => {
                self.embed_remote(OPENROUTER_API_URL, api_key, model, text)
                    .await
            }
            EmbeddingProvider::HashBased { dimension } => {
                Ok(hash_based_embedding(text, *dimension))
            }
        }
    }
}

fn parse_embedding_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let embedding = json["data"][0]["embedding"]
        .as_array()
        .ok_or_else(|| EmbeddingError::InvalidResponse("missing data[0].embedding".to_string()))?;

    if embedding.is_empty() {
        return Err(EmbeddingError::InvalidResponse("empty embedding".to_string()));
    }

    embedding
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EmbeddingError::InvalidResponse("non-numeric value".to_string()))
        })
        .collect()
}

/// Deterministic unit-length vector derived from the text hash.
fn hash_based_embedding(text: &str, dimension: usize) -> Vec<f32> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut embedding: Vec<f32> = (0..dimension)
        .map(|i| {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let hash = hasher.finish();
            ((hash as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32
        })
        .collect();

    let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in &mut embedding {
            *x /= magnitude;
        }
    }

    embedding
}

/// Cosine similarity `(a·b)/(|a||b|)`.
///
/// Returns 0.0 when the lengths differ or either vector has zero magnitude,
/// and clamps floating point drift into `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a * mag_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hash_based_embedding_deterministic() {
        let e1 = hash_based_embedding("chest pain", 16);
        let e2 = hash_based_embedding("chest pain", 16);
        assert_eq!(e1, e2);
        assert_ne!(e1, hash_based_embedding("blurred vision", 16));
    }

    #[test]
    fn test_hash_based_embedding_normalized() {
        let embedding = hash_based_embedding("thyroid levels", 100);
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_self_is_one() {
        let e = vec![0.3, -0.2, 0.9, 0.1];
        assert!((cosine_similarity(&e, &e) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_symmetric_and_bounded() {
        let a = vec![0.1, 0.7, -0.4];
        let b = vec![-0.5, 0.2, 0.8];
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert_eq!(ab, ba);
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_cosine_similarity_orthogonal_and_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.0001);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_parse_embedding_response() {
        let json = json!({"data": [{"embedding": [0.5, -0.25, 1.0]}]});
        assert_eq!(parse_embedding_response(&json).unwrap(), vec![0.5, -0.25, 1.0]);

        let bad = json!({"data": []});
        assert!(matches!(
            parse_embedding_response(&bad),
            Err(EmbeddingError::InvalidResponse(_))
        ));

        let non_numeric = json!({"data": [{"embedding": ["x"]}]});
        assert!(parse_embedding_response(&non_numeric).is_err());
    }

    #[tokio::test]
    async fn test_hash_based_embed() {
        let gen = EmbeddingGenerator::new(EmbeddingProvider::HashBased { dimension: 64 });
        assert!(!gen.is_real());
        assert_eq!(gen.provider().name(), "hash");
        let embedding = gen.embed("kidney function").await.unwrap();
        assert_eq!(embedding.len(), 64);
    }
}
