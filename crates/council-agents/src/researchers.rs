//! Research debate stages - bull, bear, and the research judge
//!
//! Bull and bear append to their own histories each round; each reads the
//! other's accumulated history from the state, so running them sequentially
//! within a round gives the bear the bull's latest argument. The judge runs
//! once, after both histories exist, and sets the once-only
//! `investment_debate.judge_decision`.

use crate::config::CouncilConfig;
use crate::context::{analyst_digest, preferences_block};
use crate::executor::StageExecutor;
use async_trait::async_trait;
use council_engine::{AnalysisState, Stage, StateUpdate};
use council_llm::LLMProvider;
use std::sync::Arc;

const BULL_PROMPT: &str = r"You are the bull researcher in an investment debate.

Build the strongest evidence-based case FOR taking a long position in the
asset, using the analyst reports you are given. Directly rebut the bear's
most recent points when they exist. Concede nothing without argument, but do
not invent data.";

const BEAR_PROMPT: &str = r"You are the bear researcher in an investment debate.

Build the strongest evidence-based case AGAINST taking a long position in
the asset, using the analyst reports you are given. Directly rebut the
bull's most recent points. Focus on downside scenarios the bull is
discounting.";

const JUDGE_PROMPT: &str = r"You are the research judge concluding an investment debate.

Weigh the bull and bear cases on their evidence, not their rhetoric. Deliver
a decisive conclusion: which side argued better, what position (if any) is
justified, and at what rough size. Avoid splitting the difference out of
caution alone.";

fn append_history(existing: Option<&str>, entry: &str) -> String {
    match existing {
        Some(h) if !h.is_empty() => format!("{h}\n\n{entry}"),
        _ => entry.to_string(),
    }
}

/// Bull-side researcher; appends to `investment_debate.bull_history`
pub struct BullResearcher {
    executor: StageExecutor,
}

impl BullResearcher {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &CouncilConfig) -> Self {
        Self {
            executor: StageExecutor::new(provider, config),
        }
    }
}

#[async_trait]
impl Stage for BullResearcher {
    fn name(&self) -> &str {
        "bull-researcher"
    }

    async fn run(&self, state: &AnalysisState) -> anyhow::Result<StateUpdate> {
        let input = format!(
            "Asset: {asset}\n\nAnalyst reports:\n{digest}\n\
             Operator preferences:\n{prefs}\n\n\
             Bear arguments so far:\n{bear}\n\n\
             Present your bull case.",
            asset = state.asset,
            digest = analyst_digest(state),
            prefs = preferences_block(state),
            bear = state
                .investment_debate
                .bear_history
                .as_deref()
                .unwrap_or("(none yet)"),
        );

        let transcript = self.executor.run(BULL_PROMPT, input).await?;
        let entry = format!("Bull: {}", transcript.final_text);

        Ok(StateUpdate {
            messages: transcript.messages,
            bull_history: Some(append_history(
                state.investment_debate.bull_history.as_deref(),
                &entry,
            )),
            ..Default::default()
        })
    }
}

/// Bear-side researcher; appends to `investment_debate.bear_history`
pub struct BearResearcher {
    executor: StageExecutor,
}

impl BearResearcher {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &CouncilConfig) -> Self {
        Self {
            executor: StageExecutor::new(provider, config),
        }
    }
}

#[async_trait]
impl Stage for BearResearcher {
    fn name(&self) -> &str {
        "bear-researcher"
    }

    async fn run(&self, state: &AnalysisState) -> anyhow::Result<StateUpdate> {
        let input = format!(
            "Asset: {asset}\n\nAnalyst reports:\n{digest}\n\
             Operator preferences:\n{prefs}\n\n\
             Bull arguments so far:\n{bull}\n\n\
             Present your bear case.",
            asset = state.asset,
            digest = analyst_digest(state),
            prefs = preferences_block(state),
            bull = state
                .investment_debate
                .bull_history
                .as_deref()
                .unwrap_or("(none yet)"),
        );

        let transcript = self.executor.run(BEAR_PROMPT, input).await?;
        let entry = format!("Bear: {}", transcript.final_text);

        Ok(StateUpdate {
            messages: transcript.messages,
            bear_history: Some(append_history(
                state.investment_debate.bear_history.as_deref(),
                &entry,
            )),
            ..Default::default()
        })
    }
}

/// Research judge; sets the once-only debate conclusion
pub struct ResearchJudge {
    executor: StageExecutor,
}

impl ResearchJudge {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &CouncilConfig) -> Self {
        Self {
            executor: StageExecutor::new(provider, config),
        }
    }
}

#[async_trait]
impl Stage for ResearchJudge {
    fn name(&self) -> &str {
        "research-judge"
    }

    async fn run(&self, state: &AnalysisState) -> anyhow::Result<StateUpdate> {
        let input = format!(
            "Asset: {asset}\n\nAnalyst reports:\n{digest}\n\
             Bull case:\n{bull}\n\nBear case:\n{bear}\n\n\
             Deliver your conclusion.",
            asset = state.asset,
            digest = analyst_digest(state),
            bull = state
                .investment_debate
                .bull_history
                .as_deref()
                .unwrap_or_default(),
            bear = state
                .investment_debate
                .bear_history
                .as_deref()
                .unwrap_or_default(),
        );

        let transcript = self.executor.run(JUDGE_PROMPT, input).await?;

        Ok(StateUpdate {
            messages: transcript.messages,
            investment_judge_decision: Some(transcript.final_text),
            ..Default::default()
        })
    }
}
