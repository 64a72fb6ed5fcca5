//! Deliberation stages for council-rs
//!
//! This crate provides the concrete stages the pipeline driver runs:
//!
//! - Four independent analysts (market, sentiment, news, fundamentals),
//!   each populating its own once-only report field
//! - The bull/bear research debate and its judge
//! - The trader, turning the research conclusion into a plan
//! - The risky/safe/neutral risk debate and the risk judge that issues the
//!   terminal trade decision
//!
//! Every stage is one opaque call from the driver's point of view: it reads
//! the current state, talks to the reasoning provider (optionally through
//! data tools), and returns a partial update. [`build_pipeline`] wires the
//! full roster into the standard stage order.

pub mod analysts;
pub mod config;
mod context;
pub mod council;
pub mod executor;
pub mod researchers;
pub mod risk;
pub mod tools;
pub mod trader;

#[cfg(test)]
mod testing;

pub use analysts::Analyst;
pub use config::{ConfigError, CouncilConfig, CouncilConfigBuilder};
pub use council::build_pipeline;
pub use executor::{StageExecutor, StageTranscript};
pub use researchers::{BearResearcher, BullResearcher, ResearchJudge};
pub use risk::{RiskDebater, RiskJudge, RiskStance};
pub use tools::{MarketCandlesTool, NewsHeadlinesTool, Tool};
pub use trader::Trader;
