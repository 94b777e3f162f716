//! Progress reporting for pipeline runs

use reqsql_core::domain::pipeline::PipelineStage;

/// Receives stage transitions while a run is in flight
///
/// Implementations must not block for long; the coordinator calls them
/// inline between backend calls.
pub trait ProgressSink: Send + Sync {
    fn on_transition(&self, from: PipelineStage, to: PipelineStage);

    /// A working stage finished and produced `items` outputs
    fn on_stage_complete(&self, _stage: PipelineStage, _items: usize) {}
}

/// Sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_transition(&self, _from: PipelineStage, _to: PipelineStage) {}
}
