//! REST API for MDT.
//!
//! This crate exposes the orchestrator over HTTP:
//! - Asking questions (`POST /api/ask`)
//! - Inspecting and toggling registry agents
//! - Reading and clearing the conversation ledger
//! - Reloading the registry and checking configuration health
//!
//! # Example
//!
//! ```ignore
//! use mdt_api::{serve, ApiConfig, AppState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Arc::new(/* ... */);
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(config, orchestrator)).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use async_trait::async_trait;
    use mdt_agent::{AgentFactoryRegistry, AgentLoader};
    use mdt_embedding::Embedder;
    use mdt_orchestrator::{Orchestrator, SimilarityRouter};
    use mdt_registry::{AgentDescriptor, LoadRef, RegistryDocument, RegistryStore};

    use crate::config::ApiConfig;
    use crate::state::AppState;

    /// Every text embeds to the same vector, so every description scores 1.0.
    pub struct FlatEmbedder;

    #[async_trait]
    impl Embedder for FlatEmbedder {
        async fn embed(&self, _text: &str) -> mdt_embedding::Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    /// Two echo specialists and a concatenating summary agent, in memory.
    pub fn make_test_state() -> AppState {
        let mut doc = RegistryDocument::default();
        doc.insert(
            "CardiologistAgent",
            AgentDescriptor::new("", LoadRef::new("echo"), "Heart and blood pressure")
                .with_tags(["cardiology"]),
        );
        doc.insert(
            "EndocrinologistAgent",
            AgentDescriptor::new("", LoadRef::new("echo"), "Thyroid and hormones"),
        );
        doc.insert(
            "SummaryAgent",
            AgentDescriptor::new("", LoadRef::new("concat"), "Merges reports").as_summary_agent(),
        );

        let store = Arc::new(RegistryStore::in_memory(doc));
        let loader = Arc::new(AgentLoader::new(store, AgentFactoryRegistry::new()));
        let orchestrator = Orchestrator::new(loader, SimilarityRouter::new(Arc::new(FlatEmbedder)));
        AppState::new(ApiConfig::default(), Arc::new(orchestrator))
    }
}
