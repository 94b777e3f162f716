//! Backend boundary traits
//!
//! The pipeline only ever sees these two traits. Concrete adapters live in
//! sibling modules; tests substitute scripted fakes.

use async_trait::async_trait;
use reqsql_core::domain::result::RowSet;

use crate::error::Result;

/// Text-completion service: one prompt in, one text out
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short identifier used in logs, usually the model name
    fn name(&self) -> &str;

    /// Sends a prompt and returns the raw completion text
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Tabular query-execution service
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Executes a SQL statement
    ///
    /// # Arguments
    /// * `sql` - The statement to run
    /// * `max_rows` - Upper bound on the rows returned
    ///
    /// # Errors
    /// A statement rejected by the database yields [`ClientError::SqlError`](crate::ClientError::SqlError);
    /// anything else (transport, auth, decoding) yields another variant.
    async fn execute(&self, sql: &str, max_rows: usize) -> Result<RowSet>;
}
