//! Stage 3: SQL queries to bounded results

use reqsql_client::QueryBackend;
use reqsql_core::domain::query::SqlQuery;
use reqsql_core::domain::result::{DISPLAY_ROW_LIMIT, ExecutionResults, QueryResult};
use reqsql_core::error::PipelineError;
use tracing::{debug, info, warn};

/// Key prefix for blank queries, followed by the query's index
pub const SKIPPED_QUERY_PREFIX: &str = "Skipped_Invalid_Query_";

/// Runs every query and records its result under the query text
///
/// Queries run one at a time in order. A failing query gets an error
/// placeholder and the rest still run. One row more than the display limit is
/// requested so the result can report truncation.
pub async fn run_queries(queries: &[SqlQuery], warehouse: &dyn QueryBackend) -> ExecutionResults {
    let mut results = ExecutionResults::new();

    for (index, query) in queries.iter().enumerate() {
        if query.is_blank() {
            warn!("Skipping {}", PipelineError::invalid_item(index, "blank query"));
            results.insert(
                SqlQuery::new(format!("{}{}", SKIPPED_QUERY_PREFIX, index)),
                QueryResult::failure("Invalid SQL query string"),
            );
            continue;
        }

        let result = match warehouse.execute(query.as_str(), DISPLAY_ROW_LIMIT + 1).await {
            Ok(row_set) => {
                debug!("Query {} returned {} rows", index, row_set.rows.len());
                QueryResult::from(row_set)
            }
            Err(e) if e.is_sql_error() => {
                warn!("{}", PipelineError::QueryExecution(e.to_string()));
                QueryResult::failure(format!("SQL Error: {}", e))
            }
            Err(e) => {
                warn!("Query {} failed on {}: {}", index, warehouse.name(), e);
                QueryResult::failure(format!("General Error: {}", e))
            }
        };

        if results.insert(query.clone(), result).is_some() {
            debug!("Query {} repeats an earlier query, keeping the latest result", index);
        }
    }

    info!(
        "Ran {} queries, {} failed",
        results.len(),
        results.error_count()
    );
    results
}
