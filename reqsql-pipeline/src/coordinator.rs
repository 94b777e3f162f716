//! Pipeline coordinator
//!
//! Owns one backend per role and runs the three stages in order. A stage
//! that produces nothing usable ends the run early; whatever earlier stages
//! produced stays in the result.

use anyhow::Context;
use chrono::Utc;
use reqsql_client::{
    AnthropicModel, CortexModel, LanguageModel, PostgresBackend, QueryBackend, SnowflakeClient,
};
use reqsql_core::domain::pipeline::{PipelineResult, PipelineStage};
use reqsql_core::error::PipelineError;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{Config, ModelProvider, WarehouseKind};
use crate::progress::{NoProgress, ProgressSink};
use crate::service::{self, ResponseCleaning};

/// Runs requirements documents through the pipeline
///
/// Holds no per-run state, so one coordinator can serve concurrent callers.
pub struct Coordinator {
    deriver: Arc<dyn LanguageModel>,
    synthesizer: Arc<dyn LanguageModel>,
    warehouse: Arc<dyn QueryBackend>,
    cleaning: ResponseCleaning,
    dialect: String,
}

impl Coordinator {
    pub fn new(
        deriver: Arc<dyn LanguageModel>,
        synthesizer: Arc<dyn LanguageModel>,
        warehouse: Arc<dyn QueryBackend>,
    ) -> Self {
        Self {
            deriver,
            synthesizer,
            warehouse,
            cleaning: ResponseCleaning::default(),
            dialect: WarehouseKind::Snowflake.dialect().to_string(),
        }
    }

    /// Cleaning rules for the synthesizer's replies
    pub fn with_cleaning(mut self, cleaning: ResponseCleaning) -> Self {
        self.cleaning = cleaning;
        self
    }

    /// SQL dialect requested from the synthesizer
    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    /// Builds every backend the configuration selects
    ///
    /// This is the only place the pipeline can fail outright: bad settings or
    /// an unreachable PostgreSQL sandbox are setup errors.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let snowflake = if config.uses_snowflake() {
            let client = SnowflakeClient::with_client(config.snowflake.clone(), http.clone())
                .context("Invalid Snowflake settings")?
                .with_statement_timeout(config.request_timeout);
            Some(Arc::new(client))
        } else {
            None
        };

        let build_model = |provider: ModelProvider, model: &str| -> anyhow::Result<Arc<dyn LanguageModel>> {
            match provider {
                ModelProvider::Cortex => {
                    let snowflake = snowflake
                        .clone()
                        .context("Cortex requires a Snowflake connection")?;
                    Ok(Arc::new(CortexModel::new(snowflake, model)))
                }
                ModelProvider::Anthropic => {
                    let api_key = config.anthropic_api_key.clone().unwrap_or_default();
                    let anthropic = AnthropicModel::with_client(api_key, model, http.clone())
                        .context("Invalid Anthropic settings")?;
                    Ok(Arc::new(anthropic))
                }
            }
        };

        let deriver = build_model(config.deriver, &config.deriver_model)?;
        let synthesizer = build_model(config.synthesizer, &config.synthesizer_model)?;

        let warehouse: Arc<dyn QueryBackend> = match config.warehouse {
            WarehouseKind::Snowflake => snowflake
                .clone()
                .context("Snowflake warehouse requires a Snowflake connection")?,
            WarehouseKind::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is not set")?;
                Arc::new(
                    PostgresBackend::connect(url)
                        .await
                        .context("Failed to connect to the PostgreSQL sandbox")?,
                )
            }
        };

        info!(
            "Pipeline backends: deriver={}:{}, synthesizer={}:{}, warehouse={}",
            config.deriver,
            config.deriver_model,
            config.synthesizer,
            config.synthesizer_model,
            warehouse.name()
        );

        Ok(Self::new(deriver, synthesizer, warehouse)
            .with_cleaning(config.synthesizer.cleaning())
            .with_dialect(config.warehouse.dialect()))
    }

    /// Runs the pipeline without progress reporting
    pub async fn run(&self, requirements: &str) -> PipelineResult {
        self.run_with_progress(requirements, &NoProgress).await
    }

    /// Runs the pipeline, reporting each stage transition to `progress`
    ///
    /// Never fails: problems end up in `PipelineResult::errors` and the
    /// returned stage is `Done` or `Aborted`.
    pub async fn run_with_progress(
        &self,
        requirements: &str,
        progress: &dyn ProgressSink,
    ) -> PipelineResult {
        let mut run = Run::new(progress);
        info!("Starting pipeline run {}", run.result.run_id);

        if requirements.trim().is_empty() {
            return run.abort(PipelineError::EmptyInput.to_string());
        }

        // Stage 1
        run.advance(PipelineStage::DerivingUseCases);
        let use_cases =
            match service::derive_use_cases(requirements, self.deriver.as_ref()).await {
                Ok(use_cases) if !use_cases.is_empty() => use_cases,
                Ok(_) => return run.abort("Use-case derivation produced no use cases"),
                Err(e) => return run.abort(format!("Use-case derivation failed: {}", e)),
            };
        run.complete(use_cases.len());
        run.result.use_cases = Some(use_cases);

        // Stage 2
        run.advance(PipelineStage::SynthesizingQueries);
        let queries = service::synthesize_queries(
            run.result.use_cases.as_deref().unwrap_or_default(),
            self.synthesizer.as_ref(),
            self.cleaning,
            &self.dialect,
        )
        .await;
        if queries.is_empty() {
            return run.abort("SQL generation produced no queries");
        }
        run.complete(queries.len());
        run.result.sql_queries = Some(queries);

        // Stage 3
        run.advance(PipelineStage::RunningQueries);
        let results = service::run_queries(
            run.result.sql_queries.as_deref().unwrap_or_default(),
            self.warehouse.as_ref(),
        )
        .await;
        run.complete(results.len());
        if results.is_empty() {
            warn!("Query execution produced no results");
            run.result
                .errors
                .push("SQL execution produced no results".to_string());
        } else {
            run.result.execution_results = Some(results);
        }

        run.finish()
    }
}

/// State of a single run
struct Run<'a> {
    result: PipelineResult,
    progress: &'a dyn ProgressSink,
}

impl<'a> Run<'a> {
    fn new(progress: &'a dyn ProgressSink) -> Self {
        Self {
            result: PipelineResult::new(),
            progress,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        let current = self.result.stage;
        if !current.can_transition_to(next) {
            error!("Unexpected pipeline transition {} -> {}", current, next);
        }
        info!("Pipeline {}: {} -> {}", self.result.run_id, current, next);
        self.progress.on_transition(current, next);
        self.result.stage = next;
    }

    fn complete(&self, items: usize) {
        self.progress.on_stage_complete(self.result.stage, items);
    }

    fn abort(mut self, message: impl Into<String>) -> PipelineResult {
        let message = message.into();
        error!("Pipeline {} aborted: {}", self.result.run_id, message);
        self.result.errors.push(message);
        self.advance(PipelineStage::Aborted);
        self.result.completed_at = Some(Utc::now());
        self.result
    }

    fn finish(mut self) -> PipelineResult {
        self.advance(PipelineStage::Done);
        self.result.completed_at = Some(Utc::now());
        info!(
            "Pipeline {} done with {} errors",
            self.result.run_id,
            self.result.errors.len()
        );
        self.result
    }
}
