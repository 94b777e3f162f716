//! Pipeline API Handlers

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use reqsql_core::domain::pipeline::PipelineResult;
use reqsql_core::dto::pipeline::{RunPipeline, SchemaInfo};
use reqsql_pipeline::Coordinator;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};

/// POST /api/pipeline/run
/// Run the pipeline over a requirements document
pub async fn run_pipeline(
    State(coordinator): State<Arc<Coordinator>>,
    req: Result<Json<RunPipeline>, JsonRejection>,
) -> ApiResult<Json<PipelineResult>> {
    let Json(req) = req?;
    req.validate().map_err(ApiError::BadRequest)?;

    tracing::info!(
        "Running pipeline over {} characters of requirements",
        req.requirements.len()
    );

    let result = coordinator.run(&req.requirements).await;

    tracing::info!(
        "Pipeline run {} finished: {} ({} errors)",
        result.run_id,
        result.stage,
        result.errors.len()
    );

    Ok(Json(result))
}

/// GET /api/schema
/// Semantic model and DDL used for SQL generation
pub async fn schema() -> Json<SchemaInfo> {
    Json(SchemaInfo::current())
}
