//! Pipeline DTOs

use serde::{Deserialize, Serialize};

/// Documents shorter than this (after trimming) are rejected as too short
pub const MIN_REQUIREMENTS_CHARS: usize = 10;

/// Request to run the pipeline over a requirements document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPipeline {
    pub requirements: String,
}

impl RunPipeline {
    pub fn new(requirements: impl Into<String>) -> Self {
        Self {
            requirements: requirements.into(),
        }
    }

    /// Rejects documents that are present but too short to analyze
    ///
    /// An empty document is accepted here; the pipeline itself reports it.
    pub fn validate(&self) -> Result<(), String> {
        let length = self.requirements.trim().chars().count();
        if length > 0 && length < MIN_REQUIREMENTS_CHARS {
            return Err(format!(
                "Requirements document seems too short ({} characters, minimum {})",
                length, MIN_REQUIREMENTS_CHARS
            ));
        }
        Ok(())
    }
}

/// Schema renderings served to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub semantic_model: String,
    pub ddl: String,
}

impl SchemaInfo {
    pub fn current() -> Self {
        Self {
            semantic_model: crate::schema::semantic_model(),
            ddl: crate::schema::ddl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_short_document() {
        assert!(RunPipeline::new("too short").validate().is_err());
        assert!(RunPipeline::new("   Claims must reference a policy.  ").validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_empty_document() {
        assert!(RunPipeline::new("").validate().is_ok());
        assert!(RunPipeline::new("  \n ").validate().is_ok());
    }

    #[test]
    fn test_schema_info() {
        let info = SchemaInfo::current();
        assert!(info.semantic_model.contains("ClaimNotes"));
        assert!(info.ddl.contains("CREATE TABLE IF NOT EXISTS ClaimNotes"));
    }
}
