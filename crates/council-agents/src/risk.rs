//! Risk debate stages - risky/safe/neutral debaters and the risk judge
//!
//! The three debaters overwrite their `current_*_response` fields on every
//! round and append to the shared discussion transcript. The judge runs
//! once after the rounds conclude and sets both the once-only
//! `risk_debate.judge_decision` and the terminal `final_trade_decision`.

use crate::config::CouncilConfig;
use crate::executor::StageExecutor;
use async_trait::async_trait;
use council_engine::{AnalysisState, Stage, StateUpdate};
use council_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

const RISKY_PROMPT: &str = r"You are the aggressive risk analyst in a risk debate.

Argue for the highest-conviction expression of the trader's plan. Push back
on excessive caution from the other analysts. Quantify the upside you see
being left on the table.";

const SAFE_PROMPT: &str = r"You are the conservative risk analyst in a risk debate.

Argue for capital preservation first. Identify the failure modes of the
trader's plan, the tail scenarios, and where exposure should be cut or
hedged. Push back on the aggressive analyst's assumptions.";

const NEUTRAL_PROMPT: &str = r"You are the neutral risk analyst in a risk debate.

Weigh the aggressive and conservative positions against each other. Identify
which of their disagreements actually matter for the plan and propose the
balanced resolution of each.";

const RISK_JUDGE_PROMPT: &str = r"You are the risk judge closing a risk debate.

Read the full discussion and the trader's plan, then issue the final,
binding trade decision. Your decision must contain an explicit action
keyword: buy, sell, or hold. State position limits or conditions where
appropriate. Be decisive.";

/// Stance of a risk debater
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskStance {
    Risky,
    Safe,
    Neutral,
}

impl fmt::Display for RiskStance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Risky => "Risky",
            Self::Safe => "Safe",
            Self::Neutral => "Neutral",
        };
        write!(f, "{name}")
    }
}

fn append_transcript(existing: Option<&str>, stance: RiskStance, text: &str) -> String {
    let entry = format!("{stance} Analyst: {text}");
    match existing {
        Some(h) if !h.is_empty() => format!("{h}\n\n{entry}"),
        _ => entry,
    }
}

/// One risk debater; overwrites its current response every round
pub struct RiskDebater {
    stance: RiskStance,
    executor: StageExecutor,
}

impl RiskDebater {
    pub fn new(
        stance: RiskStance,
        provider: Arc<dyn LLMProvider>,
        config: &CouncilConfig,
    ) -> Self {
        Self {
            stance,
            executor: StageExecutor::new(provider, config),
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self.stance {
            RiskStance::Risky => RISKY_PROMPT,
            RiskStance::Safe => SAFE_PROMPT,
            RiskStance::Neutral => NEUTRAL_PROMPT,
        }
    }
}

#[async_trait]
impl Stage for RiskDebater {
    fn name(&self) -> &str {
        match self.stance {
            RiskStance::Risky => "risky-debater",
            RiskStance::Safe => "safe-debater",
            RiskStance::Neutral => "neutral-debater",
        }
    }

    async fn run(&self, state: &AnalysisState) -> anyhow::Result<StateUpdate> {
        let input = format!(
            "Asset: {asset}\n\nTrader's plan:\n{plan}\n\n\
             Discussion so far:\n{history}\n\n\
             Give your {stance} assessment of the plan.",
            asset = state.asset,
            plan = state.trader_plan.as_deref().unwrap_or_default(),
            history = state
                .risk_debate
                .history
                .as_deref()
                .unwrap_or("(discussion opening)"),
            stance = self.stance,
        );

        let transcript = self.executor.run(self.system_prompt(), input).await?;
        let history = append_transcript(
            state.risk_debate.history.as_deref(),
            self.stance,
            &transcript.final_text,
        );

        let mut update = StateUpdate {
            messages: transcript.messages,
            risk_history: Some(history),
            ..Default::default()
        };
        let response = Some(transcript.final_text);
        match self.stance {
            RiskStance::Risky => update.risky_response = response,
            RiskStance::Safe => update.safe_response = response,
            RiskStance::Neutral => update.neutral_response = response,
        }

        Ok(update)
    }
}

/// Risk judge; sets the once-only risk conclusion and the terminal decision
pub struct RiskJudge {
    executor: StageExecutor,
}

impl RiskJudge {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &CouncilConfig) -> Self {
        Self {
            executor: StageExecutor::new(provider, config),
        }
    }
}

#[async_trait]
impl Stage for RiskJudge {
    fn name(&self) -> &str {
        "risk-judge"
    }

    async fn run(&self, state: &AnalysisState) -> anyhow::Result<StateUpdate> {
        let input = format!(
            "Asset: {asset}\n\nTrader's plan:\n{plan}\n\n\
             Full risk discussion:\n{history}\n\n\
             Issue the final trade decision.",
            asset = state.asset,
            plan = state.trader_plan.as_deref().unwrap_or_default(),
            history = state.risk_debate.history.as_deref().unwrap_or_default(),
        );

        let transcript = self.executor.run(RISK_JUDGE_PROMPT, input).await?;

        // The judge's text is both the risk conclusion and the terminal
        // decision the signal extractor reads.
        Ok(StateUpdate {
            messages: transcript.messages,
            risk_judge_decision: Some(transcript.final_text.clone()),
            final_trade_decision: Some(transcript.final_text),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scripted_provider;
    use chrono::NaiveDate;

    fn state_with_plan() -> AnalysisState {
        let mut s = AnalysisState::new(
            "BTC",
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            "",
            vec![],
        );
        s.apply(StateUpdate {
            trader_plan: Some("scale in over three days".to_string()),
            ..Default::default()
        });
        s
    }

    #[test]
    fn test_append_transcript() {
        let first = append_transcript(None, RiskStance::Risky, "push size");
        assert_eq!(first, "Risky Analyst: push size");

        let second = append_transcript(Some(&first), RiskStance::Safe, "trim it");
        assert_eq!(second, "Risky Analyst: push size\n\nSafe Analyst: trim it");
    }

    #[tokio::test]
    async fn test_debater_updates_own_response_and_history() {
        let debater = RiskDebater::new(
            RiskStance::Safe,
            scripted_provider(vec!["cut the size in half"]),
            &CouncilConfig::default(),
        );

        let update = debater.run(&state_with_plan()).await.unwrap();

        assert_eq!(update.safe_response.as_deref(), Some("cut the size in half"));
        assert!(update.risky_response.is_none());
        assert_eq!(
            update.risk_history.as_deref(),
            Some("Safe Analyst: cut the size in half")
        );
    }

    #[tokio::test]
    async fn test_judge_sets_both_terminal_fields() {
        let judge = RiskJudge::new(
            scripted_provider(vec!["Final recommendation: BUY with a 2% cap"]),
            &CouncilConfig::default(),
        );

        let update = judge.run(&state_with_plan()).await.unwrap();

        assert_eq!(
            update.risk_judge_decision.as_deref(),
            Some("Final recommendation: BUY with a 2% cap")
        );
        assert_eq!(
            update.final_trade_decision.as_deref(),
            Some("Final recommendation: BUY with a 2% cap")
        );
    }
}
