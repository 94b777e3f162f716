//! Pipeline run domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::query::{SqlQuery, UseCase};
use super::result::ExecutionResults;

/// Coordinator state
///
/// ```text
/// Idle -> DerivingUseCases -> SynthesizingQueries -> RunningQueries -> Done
///   \            \                    \
///    `------------`--------------------`-> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Idle,
    DerivingUseCases,
    SynthesizingQueries,
    RunningQueries,
    Done,
    Aborted,
}

impl PipelineStage {
    /// Whether the coordinator may move from `self` to `next`
    pub fn can_transition_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (self, next),
            (Idle, DerivingUseCases)
                | (Idle, Aborted)
                | (DerivingUseCases, SynthesizingQueries)
                | (DerivingUseCases, Aborted)
                | (SynthesizingQueries, RunningQueries)
                | (SynthesizingQueries, Aborted)
                | (RunningQueries, Done)
        )
    }

    /// 1-based stage number for the three working stages
    pub fn number(self) -> Option<usize> {
        match self {
            PipelineStage::DerivingUseCases => Some(1),
            PipelineStage::SynthesizingQueries => Some(2),
            PipelineStage::RunningQueries => Some(3),
            _ => None,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Idle => write!(f, "Idle"),
            PipelineStage::DerivingUseCases => write!(f, "Deriving use cases"),
            PipelineStage::SynthesizingQueries => write!(f, "Synthesizing queries"),
            PipelineStage::RunningQueries => write!(f, "Running queries"),
            PipelineStage::Done => write!(f, "Done"),
            PipelineStage::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Outcome of one pipeline run
///
/// Fields are filled stage by stage; a field is `None` when its stage never
/// ran or produced nothing usable. Handed out as a snapshot once the run
/// reaches a terminal stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub stage: PipelineStage,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub use_cases: Option<Vec<UseCase>>,
    pub sql_queries: Option<Vec<SqlQuery>>,
    pub execution_results: Option<ExecutionResults>,
    pub errors: Vec<String>,
}

impl PipelineResult {
    /// An empty result for a run that is about to start
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            stage: PipelineStage::Idle,
            started_at: Utc::now(),
            completed_at: None,
            use_cases: None,
            sql_queries: None,
            execution_results: None,
            errors: Vec::new(),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.stage == PipelineStage::Aborted
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Default for PipelineResult {
    fn default() -> Self {
        Self::new()
    }
}
