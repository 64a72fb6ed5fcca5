//! Stage trait - the seam to an opaque reasoning collaborator

use crate::state::{AnalysisState, StateUpdate};
use async_trait::async_trait;

/// One step of the deliberation pipeline
///
/// A stage receives the full current state and returns a partial update; the
/// driver owns merge order and branching. Stages must not retain references
/// to the state beyond their own invocation. Errors are opaque collaborator
/// failures; the driver wraps them into
/// [`EngineError::StageFailure`](crate::EngineError::StageFailure) with the
/// stage name attached.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable stage name used in logs and failure reports
    fn name(&self) -> &str;

    /// Consume the current state and produce a partial update
    async fn run(&self, state: &AnalysisState) -> anyhow::Result<StateUpdate>;
}
