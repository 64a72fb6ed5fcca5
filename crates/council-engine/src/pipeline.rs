//! Stage pipeline driver
//!
//! The deliberation order (analysts -> research debate -> research judge ->
//! trader -> risk debate -> risk judge) is a small static DAG. It is modeled
//! here as an explicit ordered list of stage groups with declared
//! preconditions: the field paths that must be non-empty before a group may
//! run. The driver owns the state for the whole run, merges one update at a
//! time, and hands the full cumulative state to the snapshot observer after
//! every merge.

use crate::error::{EngineError, Result};
use crate::stage::Stage;
use crate::state::AnalysisState;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

/// Execution mode of a stage group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    /// Run stages one after another, once
    Sequential,

    /// Run all stages concurrently; merge results in declared order
    Parallel,

    /// Run the stages sequentially, repeated for a bounded number of rounds
    Rounds(u32),
}

/// A named group of stages sharing an execution mode and preconditions
pub struct StageGroup {
    name: &'static str,
    mode: GroupMode,
    requires: Vec<&'static str>,
    stages: Vec<Arc<dyn Stage>>,
}

impl StageGroup {
    /// Create a sequential group
    pub fn sequential(name: &'static str, stages: Vec<Arc<dyn Stage>>) -> Self {
        Self {
            name,
            mode: GroupMode::Sequential,
            requires: Vec::new(),
            stages,
        }
    }

    /// Create a parallel group
    ///
    /// Stages execute concurrently but their updates are merged one at a
    /// time, in declared order; the state never sees concurrent mutation.
    pub fn parallel(name: &'static str, stages: Vec<Arc<dyn Stage>>) -> Self {
        Self {
            name,
            mode: GroupMode::Parallel,
            requires: Vec::new(),
            stages,
        }
    }

    /// Create a bounded round-robin group
    pub fn rounds(name: &'static str, rounds: u32, stages: Vec<Arc<dyn Stage>>) -> Self {
        Self {
            name,
            mode: GroupMode::Rounds(rounds),
            stages,
            requires: Vec::new(),
        }
    }

    /// Declare field paths that must be non-empty before this group runs
    pub fn with_requires(mut self, requires: Vec<&'static str>) -> Self {
        self.requires = requires;
        self
    }

    /// Group name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Drives an ordered list of stage groups over a single owned state
pub struct DeliberationPipeline {
    groups: Vec<StageGroup>,
}

impl DeliberationPipeline {
    /// Create a pipeline builder
    pub fn builder() -> DeliberationPipelineBuilder {
        DeliberationPipelineBuilder::new()
    }

    /// Run the pipeline to completion
    ///
    /// `on_snapshot` receives the full accumulated state after each stage's
    /// merge - cumulative, never a delta. On stage failure the run aborts
    /// with [`EngineError::StageFailure`]; no snapshot is emitted for the
    /// failed stage and the run is not retried.
    pub async fn run<F>(&self, mut state: AnalysisState, mut on_snapshot: F) -> Result<AnalysisState>
    where
        F: FnMut(&AnalysisState),
    {
        info!(run_id = %state.run_id, asset = %state.asset, "starting deliberation run");

        for group in &self.groups {
            for field in &group.requires {
                if !state.is_populated(field) {
                    return Err(EngineError::PreconditionFailed {
                        group: group.name.to_string(),
                        field: (*field).to_string(),
                    });
                }
            }

            match group.mode {
                GroupMode::Sequential => {
                    debug!(group = group.name, "running sequential group");
                    for stage in &group.stages {
                        run_stage(stage, &mut state, &mut on_snapshot).await?;
                    }
                }
                GroupMode::Parallel => {
                    debug!(
                        group = group.name,
                        stages = group.stages.len(),
                        "running parallel group"
                    );
                    // Workers produce immutable partial results; the merge
                    // into the shared state stays a single serialized writer.
                    let results = join_all(group.stages.iter().map(|s| s.run(&state))).await;
                    for (stage, result) in group.stages.iter().zip(results) {
                        let update = result.map_err(|source| EngineError::StageFailure {
                            stage: stage.name().to_string(),
                            source,
                        })?;
                        state.apply(update);
                        on_snapshot(&state);
                    }
                }
                GroupMode::Rounds(rounds) => {
                    for round in 1..=rounds {
                        debug!(group = group.name, round, "running debate round");
                        for stage in &group.stages {
                            run_stage(stage, &mut state, &mut on_snapshot).await?;
                        }
                    }
                }
            }
        }

        info!(run_id = %state.run_id, "deliberation run complete");
        Ok(state)
    }
}

/// Run one stage, merge its update, and emit the cumulative snapshot
async fn run_stage<F>(
    stage: &Arc<dyn Stage>,
    state: &mut AnalysisState,
    on_snapshot: &mut F,
) -> Result<()>
where
    F: FnMut(&AnalysisState),
{
    debug!(stage = stage.name(), "dispatching stage");
    let update = stage
        .run(state)
        .await
        .map_err(|source| EngineError::StageFailure {
            stage: stage.name().to_string(),
            source,
        })?;
    state.apply(update);
    on_snapshot(state);
    Ok(())
}

/// Builder for constructing pipelines
pub struct DeliberationPipelineBuilder {
    groups: Vec<StageGroup>,
}

impl DeliberationPipelineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Append a stage group
    pub fn group(mut self, group: StageGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> DeliberationPipeline {
        DeliberationPipeline {
            groups: self.groups,
        }
    }
}

impl Default for DeliberationPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
