//! Query execution results
//!
//! `RowSet` is what an execution backend hands back; `QueryResult` is the
//! bounded, display-ready shape stored in the pipeline result; and
//! `ExecutionResults` is the ordered query-to-result mapping produced by
//! the query runner.

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::query::SqlQuery;

/// Maximum number of rows kept per query result
pub const DISPLAY_ROW_LIMIT: usize = 10;

/// Header that marks a failed query result
pub const ERROR_HEADER: &str = "Error";

/// Raw tabular output of an execution backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Bounded tabular result of one query, or an error placeholder
///
/// A failure is `headers == ["Error"]` with the message as the only cell.
/// Check [`QueryResult::is_error`] before reading the first cell as a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Set when the backend had more rows than were kept
    #[serde(default)]
    pub truncated: bool,
}

impl QueryResult {
    /// Builds a success value, keeping at most [`DISPLAY_ROW_LIMIT`] rows
    pub fn success(headers: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Self {
        let truncated = rows.len() > DISPLAY_ROW_LIMIT;
        rows.truncate(DISPLAY_ROW_LIMIT);
        Self {
            headers,
            rows,
            truncated,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            headers: vec![ERROR_HEADER.to_string()],
            rows: vec![vec![Cell::Text(message.into())]],
            truncated: false,
        }
    }

    pub fn is_error(&self) -> bool {
        self.headers.first().map(String::as_str) == Some(ERROR_HEADER)
    }

    /// The error message of a failure value
    pub fn error_message(&self) -> Option<&str> {
        if !self.is_error() {
            return None;
        }
        self.rows.first()?.first()?.as_text()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl From<RowSet> for QueryResult {
    fn from(row_set: RowSet) -> Self {
        Self::success(row_set.columns, row_set.rows)
    }
}

/// One entry of the execution-result mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryExecution {
    pub query: SqlQuery,
    pub result: QueryResult,
}

/// Ordered mapping from query text to its result
///
/// Lookup is by exact query text. Inserting an existing key replaces the
/// earlier result in place, so insertion order of first occurrence is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionResults {
    entries: Vec<QueryExecution>,
}

impl ExecutionResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a result, returning the one it replaced
    pub fn insert(&mut self, query: SqlQuery, result: QueryResult) -> Option<QueryResult> {
        match self.entries.iter_mut().find(|entry| entry.query == query) {
            Some(entry) => Some(std::mem::replace(&mut entry.result, result)),
            None => {
                self.entries.push(QueryExecution { query, result });
                None
            }
        }
    }

    pub fn get(&self, query: &str) -> Option<&QueryResult> {
        self.entries
            .iter()
            .find(|entry| entry.query.as_str() == query)
            .map(|entry| &entry.result)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryExecution> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries holding an error placeholder
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.result.is_error())
            .count()
    }
}

impl<'a> IntoIterator for &'a ExecutionResults {
    type Item = &'a QueryExecution;
    type IntoIter = std::slice::Iter<'a, QueryExecution>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
