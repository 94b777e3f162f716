//! API Module
//!
//! HTTP API layer for the pipeline server.

pub mod error;
pub mod health;
pub mod pipeline;

use axum::{
    Router,
    routing::{get, post},
};
use reqsql_pipeline::Coordinator;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the main API router with all endpoints
pub fn create_router(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Schema
        .route("/api/schema", get(pipeline::schema))
        // Pipeline
        .route("/api/pipeline/run", post(pipeline::run_pipeline))
        // Add state and middleware
        .with_state(coordinator)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use reqsql_client::{LanguageModel, QueryBackend};
    use reqsql_core::domain::cell::Cell;
    use reqsql_core::domain::pipeline::{PipelineResult, PipelineStage};
    use reqsql_core::domain::result::RowSet;
    use tower::ServiceExt;

    struct FixedModel(&'static str);

    #[async_trait]
    impl LanguageModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str) -> reqsql_client::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct OneRow;

    #[async_trait]
    impl QueryBackend for OneRow {
        fn name(&self) -> &str {
            "one-row"
        }

        async fn execute(&self, _sql: &str, _max_rows: usize) -> reqsql_client::Result<RowSet> {
            Ok(RowSet {
                columns: vec!["N".to_string()],
                rows: vec![vec![Cell::Integer(1)]],
            })
        }
    }

    fn router() -> Router {
        let coordinator = Coordinator::new(
            Arc::new(FixedModel("[\"Count the policies\"]")),
            Arc::new(FixedModel("SELECT COUNT(*) AS N FROM Policies")),
            Arc::new(OneRow),
        );
        create_router(Arc::new(coordinator))
    }

    fn run_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/pipeline/run")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_schema() {
        let response = router()
            .oneshot(Request::builder().uri("/api/schema").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert!(body["semantic_model"].as_str().unwrap().contains("- name: Claims"));
        assert!(body["ddl"].as_str().unwrap().contains("CREATE TABLE IF NOT EXISTS Policies"));
    }

    #[tokio::test]
    async fn test_run_pipeline() {
        let response = router()
            .oneshot(run_request(
                r#"{"requirements": "Every policy must belong to a customer."}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let result: PipelineResult = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(result.stage, PipelineStage::Done);
        let results = result.execution_results.unwrap();
        let count = results.get("SELECT COUNT(*) AS N FROM Policies").unwrap();
        assert_eq!(count.rows, vec![vec![Cell::Integer(1)]]);
    }

    #[tokio::test]
    async fn test_short_document_rejected() {
        let response = router()
            .oneshot(run_request(r#"{"requirements": "too short"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("too short"));
    }

    #[tokio::test]
    async fn test_empty_document_runs_and_aborts() {
        let response = router()
            .oneshot(run_request(r#"{"requirements": ""}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let result: PipelineResult = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(result.stage, PipelineStage::Aborted);
        assert_eq!(result.errors, vec!["Requirements document is empty".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let response = router().oneshot(run_request("{\"text\": 1}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    async fn serve() -> reqsql_client::PipelineClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router()).await.unwrap() });
        reqsql_client::PipelineClient::new(format!("http://{}", addr))
    }

    #[tokio::test]
    async fn test_pipeline_client_against_server() {
        let client = serve().await;

        client.health().await.unwrap();

        let info = client.schema().await.unwrap();
        assert!(info.semantic_model.contains("- name: Claims"));
        assert!(info.ddl.contains("CREATE TABLE IF NOT EXISTS Policies"));

        let result = client
            .run_pipeline(reqsql_core::dto::pipeline::RunPipeline::new(
                "Every policy must belong to a customer.",
            ))
            .await
            .unwrap();
        assert_eq!(result.stage, PipelineStage::Done);
        assert!(!result.has_errors());

        let rejected = client
            .run_pipeline(reqsql_core::dto::pipeline::RunPipeline::new("too short"))
            .await
            .unwrap_err();
        assert!(rejected.is_client_error());
        assert!(!rejected.is_server_error());
    }
}
