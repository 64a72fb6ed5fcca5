//! Standard deliberation pipeline assembly
//!
//! Wires the stage roster into the fixed partial order: enabled analysts in
//! parallel, bounded bull/bear rounds, the research judge, the trader,
//! bounded risk rounds, and the risk judge - each later group gated on the
//! fields the earlier groups must have populated.

use crate::analysts::Analyst;
use crate::config::CouncilConfig;
use crate::researchers::{BearResearcher, BullResearcher, ResearchJudge};
use crate::risk::{RiskDebater, RiskJudge, RiskStance};
use crate::trader::Trader;
use council_engine::{AnalystKind, DeliberationPipeline, Stage, StageGroup};
use council_llm::LLMProvider;
use std::sync::Arc;

/// Build the standard pipeline for the enabled analyst set
pub fn build_pipeline(
    provider: &Arc<dyn LLMProvider>,
    config: &CouncilConfig,
    analysts: &[AnalystKind],
) -> DeliberationPipeline {
    let analyst_stages: Vec<Arc<dyn Stage>> = analysts
        .iter()
        .map(|kind| {
            Arc::new(Analyst::new(*kind, Arc::clone(provider), config)) as Arc<dyn Stage>
        })
        .collect();

    DeliberationPipeline::builder()
        .group(StageGroup::parallel("analysts", analyst_stages))
        .group(StageGroup::rounds(
            "research-debate",
            config.debate_rounds,
            vec![
                Arc::new(BullResearcher::new(Arc::clone(provider), config)),
                Arc::new(BearResearcher::new(Arc::clone(provider), config)),
            ],
        ))
        .group(
            StageGroup::sequential(
                "research-judge",
                vec![Arc::new(ResearchJudge::new(Arc::clone(provider), config))],
            )
            .with_requires(vec![
                "investment_debate.bull_history",
                "investment_debate.bear_history",
            ]),
        )
        .group(
            StageGroup::sequential(
                "trader",
                vec![Arc::new(Trader::new(Arc::clone(provider), config))],
            )
            .with_requires(vec!["investment_debate.judge_decision"]),
        )
        .group(StageGroup::rounds(
            "risk-debate",
            config.risk_rounds,
            vec![
                Arc::new(RiskDebater::new(
                    RiskStance::Risky,
                    Arc::clone(provider),
                    config,
                )),
                Arc::new(RiskDebater::new(
                    RiskStance::Safe,
                    Arc::clone(provider),
                    config,
                )),
                Arc::new(RiskDebater::new(
                    RiskStance::Neutral,
                    Arc::clone(provider),
                    config,
                )),
            ],
        ))
        .group(
            StageGroup::sequential(
                "risk-judge",
                vec![Arc::new(RiskJudge::new(Arc::clone(provider), config))],
            )
            .with_requires(vec![
                "risk_debate.current_risky_response",
                "risk_debate.current_safe_response",
                "risk_debate.current_neutral_response",
            ]),
        )
        .build()
}
