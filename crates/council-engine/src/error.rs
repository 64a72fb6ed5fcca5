//! Error taxonomy for deliberation runs
//!
//! Only [`EngineError::StageFailure`] and [`EngineError::UnparseableDecision`]
//! unwind a run. Persistence and notification failures are owned by the
//! callers of those collaborators and never surface here.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the deliberation core
#[derive(Error, Debug)]
pub enum EngineError {
    /// A stage's reasoning collaborator errored; the run is aborted
    #[error("stage '{stage}' failed: {source}")]
    StageFailure {
        stage: String,
        #[source]
        source: anyhow::Error,
    },

    /// A stage group was dispatched before its declared preconditions held
    #[error("group '{group}' requires populated field '{field}'")]
    PreconditionFailed { group: String, field: String },

    /// The terminal decision text is empty, so no signal can be extracted
    #[error("final trade decision is empty; no signal to extract")]
    UnparseableDecision,

    /// A section required in the final report is absent from the terminal state
    #[error("report section missing from terminal state: {0}")]
    MissingSection(&'static str),
}
