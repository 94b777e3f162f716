//! reqsql backends and HTTP client
//!
//! Two kinds of code live here:
//! - Backend adapters behind the [`LanguageModel`] and [`QueryBackend`] traits
//!   (Snowflake SQL API, Cortex COMPLETE, Anthropic Messages API, PostgreSQL)
//! - [`PipelineClient`], a type-safe client for the reqsql server API used by the CLI
//!
//! # Example
//!
//! ```no_run
//! use reqsql_client::PipelineClient;
//! use reqsql_core::dto::pipeline::RunPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PipelineClient::new("http://localhost:8080");
//!
//!     let result = client
//!         .run_pipeline(RunPipeline::new("Claims must be linked to an active policy."))
//!         .await?;
//!
//!     println!("Run {} finished in stage {}", result.run_id, result.stage);
//!     Ok(())
//! }
//! ```

pub mod anthropic;
pub mod backend;
pub mod cortex;
pub mod error;
mod pipelines;
pub mod postgres;
pub mod snowflake;

// Re-export commonly used types
pub use anthropic::AnthropicModel;
pub use backend::{LanguageModel, QueryBackend};
pub use cortex::CortexModel;
pub use error::{ClientError, Result};
pub use postgres::PostgresBackend;
pub use snowflake::{SnowflakeClient, SnowflakeSettings};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the reqsql server API
#[derive(Debug, Clone)]
pub struct PipelineClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl PipelineClient {
    /// Create a new pipeline client
    ///
    /// # Example
    /// ```
    /// use reqsql_client::PipelineClient;
    ///
    /// let client = PipelineClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new pipeline client with a custom HTTP client
    ///
    /// A full pipeline run makes several model calls, so callers usually want
    /// a generous timeout here.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
