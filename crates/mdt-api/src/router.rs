//! Router configuration and server setup.

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::handlers;
use crate::state::AppState;

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the API router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Health
        .route("/api/health", get(handlers::health))
        // Orchestration
        .route("/api/ask", post(handlers::ask))
        // Agents
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/agents/:name", get(handlers::get_agent))
        .route("/api/agents/:name/enable", post(handlers::enable_agent))
        .route("/api/agents/:name/disable", post(handlers::disable_agent))
        // Ledger
        .route(
            "/api/history",
            get(handlers::get_history).delete(handlers::clear_history),
        )
        // Registry
        .route("/api/registry/reload", post(handlers::reload_registry))
        .route("/api/config/status", get(handlers::config_status))
        // Apply middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Starts the API server.
pub async fn serve(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);
    axum::serve(listener, create_router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::make_test_state;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server() -> TestServer {
        TestServer::new(create_router(make_test_state())).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = server().get("/api/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["configuration_valid"], true);
    }

    #[tokio::test]
    async fn test_ask_and_history() {
        let server = server();

        let response = server
            .post("/api/ask")
            .json(&json!({
                "user_input": "Please prepare a health summary",
                "document_context": "TSH 5.1",
                "conversation_history": [{"role": "user", "content": "hi"}]
            }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["confidence_score"], 1.0);
        assert_eq!(
            body["routed_agents"],
            json!(["CardiologistAgent", "EndocrinologistAgent"])
        );

        let history: Value = server.get("/api/history").await.json();
        assert_eq!(history["total"], 1);
        assert_eq!(history["turns"][0]["user_input"], "Please prepare a health summary");

        server
            .delete("/api/history")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let history: Value = server.get("/api/history").await.json();
        assert_eq!(history["total"], 0);
    }

    #[tokio::test]
    async fn test_ask_rejects_missing_input() {
        let response = server()
            .post("/api/ask")
            .json(&json!({ "document_context": "x" }))
            .expect_failure()
            .await;
        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn test_ask_reports_configuration_error() {
        let server = server();
        server
            .post("/api/agents/SummaryAgent/disable")
            .await
            .assert_status_ok();

        let body: Value = server
            .post("/api/ask")
            .json(&json!({ "user_input": "my heart races" }))
            .await
            .json();
        assert_eq!(body["status"], "configuration_error");
        assert_eq!(body["configuration_issues"], json!(["No summary agent configured"]));
        assert_eq!(
            body["available_agents"],
            json!(["CardiologistAgent", "EndocrinologistAgent"])
        );
    }

    #[tokio::test]
    async fn test_get_agent() {
        let server = server();

        let body: Value = server.get("/api/agents/CardiologistAgent").await.json();
        assert_eq!(body["factory"], "echo");
        assert_eq!(body["tags"], json!(["cardiology"]));

        server
            .get("/api/agents/Nobody")
            .expect_failure()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_config_status_and_reload() {
        let server = server();

        let status: Value = server.get("/api/config/status").await.json();
        assert_eq!(status["valid"], true);
        assert_eq!(status["summary_agent"], "SummaryAgent");

        let reload = server.post("/api/registry/reload").await;
        reload.assert_status_ok();
        let body: Value = reload.json();
        assert_eq!(body["agents"], 3);
    }
}
