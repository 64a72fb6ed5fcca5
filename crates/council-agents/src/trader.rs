//! Trader stage - turns the research conclusion into an actionable plan

use crate::config::CouncilConfig;
use crate::context::{analyst_digest, preferences_block};
use crate::executor::StageExecutor;
use async_trait::async_trait;
use council_engine::{AnalysisState, Stage, StateUpdate};
use council_llm::LLMProvider;
use std::sync::Arc;

const TRADER_PROMPT: &str = r"You are the trader on the desk.

Turn the research conclusion into a concrete, actionable plan: direction,
entry approach, position size relative to the operator's preferences, and
the conditions that would invalidate the trade. If the research conclusion
does not justify a position, say so plainly and plan accordingly.";

/// Produces the once-only trader plan after the research judge has ruled
pub struct Trader {
    executor: StageExecutor,
}

impl Trader {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &CouncilConfig) -> Self {
        Self {
            executor: StageExecutor::new(provider, config),
        }
    }
}

#[async_trait]
impl Stage for Trader {
    fn name(&self) -> &str {
        "trader"
    }

    async fn run(&self, state: &AnalysisState) -> anyhow::Result<StateUpdate> {
        let input = format!(
            "Asset: {asset}\nTrade date: {date}\n\n\
             Analyst reports:\n{digest}\n\
             Research conclusion:\n{conclusion}\n\n\
             Operator preferences:\n{prefs}\n\n\
             Write your investment plan.",
            asset = state.asset,
            date = state.trade_date.format("%Y-%m-%d"),
            digest = analyst_digest(state),
            conclusion = state
                .investment_debate
                .judge_decision
                .as_deref()
                .unwrap_or_default(),
            prefs = preferences_block(state),
        );

        let transcript = self.executor.run(TRADER_PROMPT, input).await?;

        Ok(StateUpdate {
            messages: transcript.messages,
            trader_plan: Some(transcript.final_text),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scripted_provider;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_trader_sets_plan() {
        let mut state = AnalysisState::new(
            "BTC",
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            "",
            vec![],
        );
        state.apply(StateUpdate {
            investment_judge_decision: Some("buy small".to_string()),
            ..Default::default()
        });

        let trader = Trader::new(
            scripted_provider(vec!["scale in over three days"]),
            &CouncilConfig::default(),
        );
        let update = trader.run(&state).await.unwrap();

        assert_eq!(
            update.trader_plan.as_deref(),
            Some("scale in over three days")
        );
        assert!(update.final_trade_decision.is_none());
    }
}
