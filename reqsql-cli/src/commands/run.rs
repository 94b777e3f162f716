//! Run command handler
//!
//! Reads a requirements document and runs it through the pipeline, locally
//! or on the configured server, then prints the outcome.

use anyhow::{Context, Result};
use colored::*;
use reqsql_client::{ClientError, PipelineClient};
use reqsql_core::domain::pipeline::PipelineResult;
use reqsql_core::dto::pipeline::RunPipeline;
use reqsql_pipeline::Coordinator;
use std::path::Path;

use crate::config::Config;
use crate::render::{self, StatusLines};

pub async fn handle_run_command(file: &Path, json: bool, config: &Config) -> Result<()> {
    let requirements = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let req = RunPipeline::new(requirements);
    if let Err(msg) = req.validate() {
        anyhow::bail!(msg);
    }

    let result = match config.server_url {
        Some(_) => run_remote(&config.remote_client()?, req, json).await?,
        None => run_local(&req.requirements, json).await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render::print_pipeline_result(&result);
    }

    if result.is_aborted() {
        anyhow::bail!("Pipeline aborted in run {}", result.run_id);
    }
    Ok(())
}

async fn run_local(requirements: &str, quiet: bool) -> Result<PipelineResult> {
    let pipeline_config =
        reqsql_pipeline::Config::from_env().context("Failed to load pipeline configuration")?;
    let coordinator = Coordinator::from_config(&pipeline_config).await?;

    if quiet {
        return Ok(coordinator.run(requirements).await);
    }
    Ok(coordinator.run_with_progress(requirements, &StatusLines).await)
}

async fn run_remote(client: &PipelineClient, req: RunPipeline, quiet: bool) -> Result<PipelineResult> {
    client
        .health()
        .await
        .map_err(|e| remote_error(client.base_url(), e))?;

    if !quiet {
        println!("{}", format!("Running pipeline on {}...", client.base_url()).dimmed());
    }

    client
        .run_pipeline(req)
        .await
        .map_err(|e| remote_error(client.base_url(), e))
}

/// Explains a failed server call in terms of who is at fault
pub(crate) fn remote_error(url: &str, err: ClientError) -> anyhow::Error {
    if err.is_client_error() {
        anyhow::anyhow!("Server at {} rejected the request: {}", url, err)
    } else if err.is_server_error() {
        anyhow::anyhow!("Server at {} failed: {}", url, err)
    } else {
        anyhow::Error::new(err).context(format!("Could not reach server at {}", url))
    }
}
