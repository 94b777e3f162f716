//! Use case and SQL query types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A natural-language description of a database behavior to be tested
///
/// Construction is unchecked: stages validate their inputs and skip blank
/// items, so a `UseCase` may be blank when it comes from outside the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UseCase(String);

impl UseCase {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the text is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for UseCase {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for UseCase {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A SQL query string, assumed syntactically plausible
///
/// Equality is exact text equality; that is what synthesizer deduplication
/// and the execution-result mapping key on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqlQuery(String);

impl SqlQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for SqlQuery {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for SqlQuery {
    fn from(sql: String) -> Self {
        Self(sql)
    }
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
