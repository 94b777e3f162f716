//! Snowflake Cortex language model
//!
//! Cortex is reached through SQL: the prompt is embedded as a string literal
//! in a `SNOWFLAKE.CORTEX.COMPLETE` call and the completion comes back as the
//! single cell of a one-row result.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::backend::{LanguageModel, QueryBackend};
use crate::error::{ClientError, Result};

/// Language model served by Snowflake Cortex
#[derive(Clone)]
pub struct CortexModel {
    warehouse: Arc<dyn QueryBackend>,
    model: String,
}

impl CortexModel {
    pub fn new(warehouse: Arc<dyn QueryBackend>, model: impl Into<String>) -> Self {
        Self {
            warehouse,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for CortexModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CortexModel")
            .field("warehouse", &self.warehouse.name())
            .field("model", &self.model)
            .finish()
    }
}

/// Escapes text for use inside a single-quoted SQL literal
pub fn escape_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "''")
}

/// Builds the COMPLETE statement for a model and prompt
pub fn completion_statement(model: &str, prompt: &str) -> String {
    format!(
        "SELECT SNOWFLAKE.CORTEX.COMPLETE('{}', '{}') AS RESPONSE",
        escape_literal(model),
        escape_literal(prompt)
    )
}

#[async_trait]
impl LanguageModel for CortexModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Cortex completion with {} ({} prompt chars)", self.model, prompt.len());

        let statement = completion_statement(&self.model, prompt);
        let row_set = self.warehouse.execute(&statement, 1).await?;

        row_set
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .and_then(|cell| cell.as_text().map(str::to_string))
            .ok_or_else(|| ClientError::ParseError("Cortex returned no completion".to_string()))
    }
}
