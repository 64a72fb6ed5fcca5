//! Analyst stages - the independent first wave of the deliberation
//!
//! Each analyst populates exactly one report field, once. The four analysts
//! have no dependencies on each other and are safe to run in a parallel
//! group; the driver serializes their merges.

use crate::config::CouncilConfig;
use crate::context::{external_reports_block, preferences_block};
use crate::executor::StageExecutor;
use crate::tools::{MarketCandlesTool, NewsHeadlinesTool, Tool};
use async_trait::async_trait;
use council_engine::{AnalysisState, AnalystKind, Stage, StateUpdate};
use council_llm::LLMProvider;
use std::sync::Arc;

const MARKET_PROMPT: &str = r"You are a market analyst specializing in price action and technical structure for traded assets.

Your job:
1. Fetch recent daily candles for the asset under analysis
2. Describe the prevailing trend, momentum, and notable levels
3. Call out volume behavior and volatility regime changes
4. Conclude with a clear technical read for the requested trade date

Ground every claim in the data you fetched. Do not speculate beyond the
window you retrieved. Write a self-contained report; it will be read
without access to this conversation.";

const SENTIMENT_PROMPT: &str = r"You are a sentiment analyst covering social and community mood around traded assets.

Assess the prevailing sentiment for the asset: crowd positioning, fear/greed
tone, and any divergence between sentiment and price. Weigh any supplementary
reports the operator provided. Be explicit when the evidence is thin. Write a
self-contained report.";

const NEWS_PROMPT: &str = r"You are a news analyst covering events that move traded assets.

Your job:
1. Fetch recent headlines for the asset
2. Separate material events from noise
3. Assess the likely directional impact of the significant items
4. Note any scheduled upcoming events that could matter for the trade date

Distinguish asset-specific news from market-wide news. Write a
self-contained report.";

const FUNDAMENTALS_PROMPT: &str = r"You are a fundamentals analyst for traded assets.

Evaluate the asset's underlying health: adoption and usage trends, supply
dynamics, holder behavior, and relative valuation versus its own history.
Lean on the supplementary reports where they are relevant. State your
confidence level explicitly. Write a self-contained report.";

/// One analyst stage, parameterized by kind
pub struct Analyst {
    kind: AnalystKind,
    executor: StageExecutor,
}

impl Analyst {
    /// Create an analyst of the given kind with its data tools attached
    pub fn new(kind: AnalystKind, provider: Arc<dyn LLMProvider>, config: &CouncilConfig) -> Self {
        let tools: Vec<Arc<dyn Tool>> = match kind {
            AnalystKind::Market => vec![Arc::new(MarketCandlesTool::new())],
            AnalystKind::News => vec![Arc::new(NewsHeadlinesTool::new())],
            // Sentiment and fundamentals reason over the supplied context.
            AnalystKind::Sentiment | AnalystKind::Fundamentals => vec![],
        };

        Self {
            kind,
            executor: StageExecutor::new(provider, config).with_tools(tools),
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self.kind {
            AnalystKind::Market => MARKET_PROMPT,
            AnalystKind::Sentiment => SENTIMENT_PROMPT,
            AnalystKind::News => NEWS_PROMPT,
            AnalystKind::Fundamentals => FUNDAMENTALS_PROMPT,
        }
    }

    fn user_input(&self, state: &AnalysisState) -> String {
        format!(
            "Analyze {asset} for trade date {date}.\n\n\
             Operator investment preferences:\n{prefs}\n{external}\n\
             Produce your {kind} report for {asset}.",
            asset = state.asset,
            date = state.trade_date.format("%Y-%m-%d"),
            prefs = preferences_block(state),
            external = external_reports_block(state),
            kind = self.kind,
        )
    }
}

#[async_trait]
impl Stage for Analyst {
    fn name(&self) -> &str {
        match self.kind {
            AnalystKind::Market => "market-analyst",
            AnalystKind::Sentiment => "sentiment-analyst",
            AnalystKind::News => "news-analyst",
            AnalystKind::Fundamentals => "fundamentals-analyst",
        }
    }

    async fn run(&self, state: &AnalysisState) -> anyhow::Result<StateUpdate> {
        let transcript = self
            .executor
            .run(self.system_prompt(), self.user_input(state))
            .await?;

        let mut update = StateUpdate {
            messages: transcript.messages,
            ..Default::default()
        };
        let report = Some(transcript.final_text);
        match self.kind {
            AnalystKind::Market => update.market_report = report,
            AnalystKind::Sentiment => update.sentiment_report = report,
            AnalystKind::News => update.news_report = report,
            AnalystKind::Fundamentals => update.fundamentals_report = report,
        }

        Ok(update)
    }
}
