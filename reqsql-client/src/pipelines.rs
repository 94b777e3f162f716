//! Pipeline API endpoints

use crate::PipelineClient;
use crate::error::{ClientError, Result};
use reqsql_core::domain::pipeline::PipelineResult;
use reqsql_core::dto::pipeline::{RunPipeline, SchemaInfo};

impl PipelineClient {
    /// Run the full pipeline over a requirements document
    ///
    /// The server always answers with a [`PipelineResult`]; a run that stopped
    /// early comes back with stage `Aborted` and its errors filled in.
    pub async fn run_pipeline(&self, req: RunPipeline) -> Result<PipelineResult> {
        let url = format!("{}/api/pipeline/run", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Fetch the semantic model and DDL the server generates SQL against
    pub async fn schema(&self) -> Result<SchemaInfo> {
        let url = format!("{}/api/schema", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Check that the server is up
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ClientError::api_error(status.as_u16(), "Health check failed"));
        }
        Ok(())
    }
}
