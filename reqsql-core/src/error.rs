//! Pipeline error taxonomy

use thiserror::Error;

/// Result type alias for pipeline stage operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised by the pipeline stages
///
/// Item-level kinds (`QueryExecution`, `InvalidItem`) are captured into the
/// item's result slot and never abort a stage. The others invalidate a whole
/// stage and end up as a message in `PipelineResult::errors`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No requirements text, or whitespace only
    #[error("Requirements document is empty")]
    EmptyInput,

    /// The language model or execution backend could not be reached
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Model output did not have the expected structure
    #[error("Malformed language model response: {0}")]
    MalformedResponse(String),

    /// The execution backend rejected a query
    #[error("Query execution failed: {0}")]
    QueryExecution(String),

    /// A blank use case or query in the middle of a list
    #[error("Invalid item at index {index}: {reason}")]
    InvalidItem { index: usize, reason: String },
}

impl PipelineError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendUnavailable(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn invalid_item(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidItem {
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(PipelineError::EmptyInput.to_string(), "Requirements document is empty");
        assert_eq!(
            PipelineError::invalid_item(2, "blank use case").to_string(),
            "Invalid item at index 2: blank use case"
        );
    }
}
