//! Analysis state threaded through a deliberation run
//!
//! The state is owned exclusively by the pipeline driver. Stages receive a
//! shared reference and hand back a [`StateUpdate`]; the driver merges
//! updates one at a time, so the state never sees concurrent mutation.
//!
//! Presence is monotonic for the once-only fields (the four analyst reports,
//! both judge decisions, the trader plan, and the final decision): once
//! non-empty they are never reset. The risk-debate `current_*_response`
//! fields are overwritten across rounds by design.

use chrono::NaiveDate;
use council_llm::Message;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The fixed enumeration of analyst stages a run may enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalystKind {
    /// Price action and technical structure
    Market,
    /// Social/community sentiment
    Sentiment,
    /// News flow and event impact
    News,
    /// Fundamental/on-chain valuation
    Fundamentals,
}

impl AnalystKind {
    /// All analyst kinds, in canonical report order
    pub const ALL: [AnalystKind; 4] = [
        AnalystKind::Market,
        AnalystKind::Sentiment,
        AnalystKind::News,
        AnalystKind::Fundamentals,
    ];

    /// State field path this analyst populates
    pub fn report_path(&self) -> &'static str {
        match self {
            Self::Market => "market_report",
            Self::Sentiment => "sentiment_report",
            Self::News => "news_report",
            Self::Fundamentals => "fundamentals_report",
        }
    }

    /// Section title used in the assembled report
    pub fn section_title(&self) -> &'static str {
        match self {
            Self::Market => "Market Analysis",
            Self::Sentiment => "Sentiment Analysis",
            Self::News => "News Analysis",
            Self::Fundamentals => "Fundamentals Analysis",
        }
    }
}

impl fmt::Display for AnalystKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Market => "market",
            Self::Sentiment => "sentiment",
            Self::News => "news",
            Self::Fundamentals => "fundamentals",
        };
        write!(f, "{name}")
    }
}

impl FromStr for AnalystKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "market" => Ok(Self::Market),
            // "social" kept as an accepted alias for sentiment
            "sentiment" | "social" => Ok(Self::Sentiment),
            "news" => Ok(Self::News),
            "fundamentals" => Ok(Self::Fundamentals),
            other => Err(format!("unknown analyst kind: {other}")),
        }
    }
}

/// Bull/bear research debate sub-record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestmentDebateState {
    /// Accumulated bull arguments (append/replace per round)
    pub bull_history: Option<String>,

    /// Accumulated bear arguments (append/replace per round)
    pub bear_history: Option<String>,

    /// Research judge conclusion, set once after both histories exist
    pub judge_decision: Option<String>,
}

/// Risk debate sub-record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDebateState {
    /// Latest risky-stance response, overwritten per round
    pub current_risky_response: Option<String>,

    /// Latest safe-stance response, overwritten per round
    pub current_safe_response: Option<String>,

    /// Latest neutral-stance response, overwritten per round
    pub current_neutral_response: Option<String>,

    /// Running transcript of the whole discussion, consumed by the judge
    pub history: Option<String>,

    /// Risk judge conclusion, set once, terminal for this sub-record
    pub judge_decision: Option<String>,
}

/// The single mutable record threaded through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisState {
    /// Unique identifier for this run
    pub run_id: String,

    /// Asset under deliberation (e.g. "BTC")
    pub asset: String,

    /// Target date of the analysis
    pub trade_date: NaiveDate,

    /// Caller-supplied free-text investment preferences (may be empty)
    pub investment_preferences: String,

    /// Externally supplied supplementary report texts, order-preserving
    pub external_reports: Vec<String>,

    /// Conversation turns, append-only; the last element is inspected for
    /// pending tool invocations
    pub messages: Vec<Message>,

    /// Market analyst report, set at most once
    pub market_report: Option<String>,

    /// Sentiment analyst report, set at most once
    pub sentiment_report: Option<String>,

    /// News analyst report, set at most once
    pub news_report: Option<String>,

    /// Fundamentals analyst report, set at most once
    pub fundamentals_report: Option<String>,

    /// Bull/bear research debate
    pub investment_debate: InvestmentDebateState,

    /// Trader plan, set once after the research judge decision exists
    pub trader_plan: Option<String>,

    /// Risk debate
    pub risk_debate: RiskDebateState,

    /// Terminal free-text decision; only valid once
    /// `risk_debate.judge_decision` is non-empty
    pub final_trade_decision: Option<String>,
}

impl AnalysisState {
    /// Create the initial state for a run, all deliberation fields empty
    pub fn new(
        asset: impl Into<String>,
        trade_date: NaiveDate,
        investment_preferences: impl Into<String>,
        external_reports: Vec<String>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            asset: asset.into(),
            trade_date,
            investment_preferences: investment_preferences.into(),
            external_reports,
            messages: Vec::new(),
            market_report: None,
            sentiment_report: None,
            news_report: None,
            fundamentals_report: None,
            investment_debate: InvestmentDebateState::default(),
            trader_plan: None,
            risk_debate: RiskDebateState::default(),
            final_trade_decision: None,
        }
    }

    /// Merge a stage's partial update into the state
    ///
    /// Messages extend; `Some` fields overwrite; absent fields leave the
    /// state untouched. This is the single writer for the whole run.
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            messages,
            market_report,
            sentiment_report,
            news_report,
            fundamentals_report,
            bull_history,
            bear_history,
            investment_judge_decision,
            trader_plan,
            risky_response,
            safe_response,
            neutral_response,
            risk_history,
            risk_judge_decision,
            final_trade_decision,
        } = update;

        self.messages.extend(messages);

        if let Some(v) = market_report {
            self.market_report = Some(v);
        }
        if let Some(v) = sentiment_report {
            self.sentiment_report = Some(v);
        }
        if let Some(v) = news_report {
            self.news_report = Some(v);
        }
        if let Some(v) = fundamentals_report {
            self.fundamentals_report = Some(v);
        }
        if let Some(v) = bull_history {
            self.investment_debate.bull_history = Some(v);
        }
        if let Some(v) = bear_history {
            self.investment_debate.bear_history = Some(v);
        }
        if let Some(v) = investment_judge_decision {
            self.investment_debate.judge_decision = Some(v);
        }
        if let Some(v) = trader_plan {
            self.trader_plan = Some(v);
        }
        if let Some(v) = risky_response {
            self.risk_debate.current_risky_response = Some(v);
        }
        if let Some(v) = safe_response {
            self.risk_debate.current_safe_response = Some(v);
        }
        if let Some(v) = neutral_response {
            self.risk_debate.current_neutral_response = Some(v);
        }
        if let Some(v) = risk_history {
            self.risk_debate.history = Some(v);
        }
        if let Some(v) = risk_judge_decision {
            self.risk_debate.judge_decision = Some(v);
        }
        if let Some(v) = final_trade_decision {
            self.final_trade_decision = Some(v);
        }
    }

    /// Look up a tracked field by path
    ///
    /// Paths use dotted notation for the debate sub-records, e.g.
    /// `"risk_debate.current_safe_response"`. Unknown paths resolve to
    /// `None`.
    pub fn field(&self, path: &str) -> Option<&str> {
        let value = match path {
            "market_report" => &self.market_report,
            "sentiment_report" => &self.sentiment_report,
            "news_report" => &self.news_report,
            "fundamentals_report" => &self.fundamentals_report,
            "investment_debate.bull_history" => &self.investment_debate.bull_history,
            "investment_debate.bear_history" => &self.investment_debate.bear_history,
            "investment_debate.judge_decision" => &self.investment_debate.judge_decision,
            "trader_plan" => &self.trader_plan,
            "risk_debate.current_risky_response" => &self.risk_debate.current_risky_response,
            "risk_debate.current_safe_response" => &self.risk_debate.current_safe_response,
            "risk_debate.current_neutral_response" => &self.risk_debate.current_neutral_response,
            "risk_debate.history" => &self.risk_debate.history,
            "risk_debate.judge_decision" => &self.risk_debate.judge_decision,
            "final_trade_decision" => &self.final_trade_decision,
            _ => return None,
        };
        value.as_deref()
    }

    /// Whether a field holds a non-empty value
    pub fn is_populated(&self, path: &str) -> bool {
        self.field(path).is_some_and(|v| !v.is_empty())
    }
}

/// Partial update returned by a stage, merged by the driver
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    /// New conversation turns to append
    pub messages: Vec<Message>,

    pub market_report: Option<String>,
    pub sentiment_report: Option<String>,
    pub news_report: Option<String>,
    pub fundamentals_report: Option<String>,

    pub bull_history: Option<String>,
    pub bear_history: Option<String>,
    pub investment_judge_decision: Option<String>,

    pub trader_plan: Option<String>,

    pub risky_response: Option<String>,
    pub safe_response: Option<String>,
    pub neutral_response: Option<String>,
    pub risk_history: Option<String>,
    pub risk_judge_decision: Option<String>,

    pub final_trade_decision: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AnalysisState {
        AnalysisState::new(
            "BTC",
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            "",
            vec![],
        )
    }

    #[test]
    fn test_initial_state_is_empty() {
        let state = test_state();
        assert!(state.messages.is_empty());
        assert!(state.market_report.is_none());
        assert!(state.investment_debate.judge_decision.is_none());
        assert!(state.final_trade_decision.is_none());
        assert!(!state.run_id.is_empty());
    }

    #[test]
    fn test_apply_preserves_unrelated_fields() {
        let mut state = test_state();
        state.apply(StateUpdate {
            market_report: Some("bullish breakout".to_string()),
            ..Default::default()
        });
        state.apply(StateUpdate {
            news_report: Some("quiet week".to_string()),
            ..Default::default()
        });

        assert_eq!(state.market_report.as_deref(), Some("bullish breakout"));
        assert_eq!(state.news_report.as_deref(), Some("quiet week"));
        assert!(state.sentiment_report.is_none());
    }

    #[test]
    fn test_apply_extends_messages() {
        let mut state = test_state();
        state.apply(StateUpdate {
            messages: vec![Message::user("round 1")],
            ..Default::default()
        });
        state.apply(StateUpdate {
            messages: vec![Message::assistant("reply")],
            ..Default::default()
        });

        assert_eq!(state.messages.len(), 2);
    }

    #[test]
    fn test_multi_round_field_overwrites() {
        let mut state = test_state();
        state.apply(StateUpdate {
            risky_response: Some("go all in".to_string()),
            ..Default::default()
        });
        state.apply(StateUpdate {
            risky_response: Some("size up moderately".to_string()),
            ..Default::default()
        });

        assert_eq!(
            state.risk_debate.current_risky_response.as_deref(),
            Some("size up moderately")
        );
    }

    #[test]
    fn test_field_lookup_by_path() {
        let mut state = test_state();
        assert_eq!(state.field("market_report"), None);
        assert!(!state.is_populated("market_report"));

        state.apply(StateUpdate {
            safe_response: Some("hedge first".to_string()),
            ..Default::default()
        });

        assert_eq!(
            state.field("risk_debate.current_safe_response"),
            Some("hedge first")
        );
        assert!(state.is_populated("risk_debate.current_safe_response"));
        assert_eq!(state.field("no_such_field"), None);
    }

    #[test]
    fn test_analyst_kind_parsing() {
        assert_eq!("market".parse::<AnalystKind>().unwrap(), AnalystKind::Market);
        assert_eq!(
            "social".parse::<AnalystKind>().unwrap(),
            AnalystKind::Sentiment
        );
        assert_eq!(
            " News ".parse::<AnalystKind>().unwrap(),
            AnalystKind::News
        );
        assert!("quant".parse::<AnalystKind>().is_err());
    }

    #[test]
    fn test_analyst_kind_paths() {
        assert_eq!(AnalystKind::Market.report_path(), "market_report");
        assert_eq!(
            AnalystKind::Fundamentals.report_path(),
            "fundamentals_report"
        );
    }
}
