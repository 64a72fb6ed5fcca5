//! Deliberation core for council-rs
//!
//! This crate owns the mechanics of a deliberation run, independent of what
//! any stage actually reasons about:
//!
//! - [`AnalysisState`]: the single mutable record threaded through the run,
//!   with [`StateUpdate`] merge semantics owned by the driver
//! - [`Stage`]: the seam to an opaque reasoning collaborator
//! - [`DeliberationPipeline`]: ordered stage groups with declared field
//!   preconditions, emitting a cumulative snapshot after every merge
//! - [`CompletionTracker`]: a value-versioned map over tracked field paths
//!   that fires each completion side effect exactly once (or once per
//!   distinct value for multi-round fields)
//! - [`TradeSignal`]: normalized Buy/Sell/Hold extraction from the terminal
//!   free-text decision
//! - [`assemble`](report::assemble): ordered report sections pulled from the
//!   terminal snapshot
//!
//! The pipeline emits the *entire* accumulated state after each stage, not a
//! diff; the tracker exists so that repeated observations of an unchanged
//! field never re-trigger a side effect.

pub mod error;
pub mod pipeline;
pub mod report;
pub mod signal;
pub mod stage;
pub mod state;
pub mod tracker;

pub use error::{EngineError, Result};
pub use pipeline::{DeliberationPipeline, DeliberationPipelineBuilder, GroupMode, StageGroup};
pub use report::{ReportSection, assemble};
pub use signal::TradeSignal;
pub use stage::Stage;
pub use state::{AnalysisState, AnalystKind, InvestmentDebateState, RiskDebateState, StateUpdate};
pub use tracker::{CompletionTracker, FieldEvent, TrackPolicy};
