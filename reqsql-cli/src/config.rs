//! Configuration module
//!
//! Settings shared by every command. In-process runs read the pipeline's own
//! environment configuration on top of this.

use anyhow::{Context, Result};
use reqsql_client::PipelineClient;
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of a reqsql server, when runs should happen remotely
    pub server_url: Option<String>,
}

impl Config {
    /// Client for the configured server
    pub fn remote_client(&self) -> Result<PipelineClient> {
        let url = self
            .server_url
            .as_deref()
            .context("No server configured (use --server or REQSQL_SERVER_URL)")?;

        // A run makes one model call per use case, so allow plenty of time
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(PipelineClient::with_client(url, http))
    }
}
