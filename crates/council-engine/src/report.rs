//! Report assembly from the terminal snapshot
//!
//! Pulls exactly the once-only report fields plus the normalized decision,
//! in a fixed order. A field that should exist but does not is a
//! data-integrity error, never a silent gap: an enabled analyst without a
//! report, or any missing terminal field, fails the assembly.

use crate::error::{EngineError, Result};
use crate::signal::TradeSignal;
use crate::state::{AnalysisState, AnalystKind};

/// One named section of the persisted report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    /// Section title
    pub title: &'static str,

    /// Section body text
    pub body: String,
}

/// Assemble the ordered report sections from a terminal snapshot
///
/// Section order: the enabled analyst reports (canonical order), the
/// research judge conclusion, the trader plan, the risk judge conclusion,
/// the terminal decision text, and the normalized decision.
pub fn assemble(
    state: &AnalysisState,
    enabled: &[AnalystKind],
    decision: TradeSignal,
) -> Result<Vec<ReportSection>> {
    let mut sections = Vec::new();

    for kind in AnalystKind::ALL {
        if !enabled.contains(&kind) {
            continue;
        }
        let body = required(state, kind.report_path())?;
        sections.push(ReportSection {
            title: kind.section_title(),
            body,
        });
    }

    sections.push(ReportSection {
        title: "Research Conclusion",
        body: required(state, "investment_debate.judge_decision")?,
    });
    sections.push(ReportSection {
        title: "Trader Investment Plan",
        body: required(state, "trader_plan")?,
    });
    sections.push(ReportSection {
        title: "Risk Assessment",
        body: required(state, "risk_debate.judge_decision")?,
    });
    sections.push(ReportSection {
        title: "Final Trade Decision",
        body: required(state, "final_trade_decision")?,
    });
    sections.push(ReportSection {
        title: "Decision",
        body: decision.to_string(),
    });

    Ok(sections)
}

fn required(state: &AnalysisState, path: &'static str) -> Result<String> {
    state
        .field(path)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(EngineError::MissingSection(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateUpdate;
    use chrono::NaiveDate;

    fn completed_state() -> AnalysisState {
        let mut s = AnalysisState::new(
            "BTC",
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            "",
            vec![],
        );
        s.apply(StateUpdate {
            market_report: Some("bullish breakout".to_string()),
            sentiment_report: Some("neutral".to_string()),
            investment_judge_decision: Some("buy small".to_string()),
            trader_plan: Some("scale in over three days".to_string()),
            risk_judge_decision: Some("approved with a 2% cap".to_string()),
            final_trade_decision: Some("Final recommendation: BUY".to_string()),
            ..Default::default()
        });
        s
    }

    #[test]
    fn test_full_scripted_run_assembly() {
        let enabled = [AnalystKind::Market, AnalystKind::Sentiment];
        let sections = assemble(&completed_state(), &enabled, TradeSignal::Buy).unwrap();

        let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec![
                "Market Analysis",
                "Sentiment Analysis",
                "Research Conclusion",
                "Trader Investment Plan",
                "Risk Assessment",
                "Final Trade Decision",
                "Decision",
            ]
        );

        assert_eq!(sections[0].body, "bullish breakout");
        assert_eq!(sections[1].body, "neutral");
        assert_eq!(sections[2].body, "buy small");
        // The normalized decision rides along as its own section.
        assert_eq!(sections.last().unwrap().body, "Buy");
    }

    #[test]
    fn test_disabled_analyst_is_omitted_not_an_error() {
        let sections =
            assemble(&completed_state(), &[AnalystKind::Market], TradeSignal::Buy).unwrap();
        assert!(sections.iter().all(|s| s.title != "Sentiment Analysis"));
    }

    #[test]
    fn test_enabled_analyst_without_report_is_integrity_error() {
        let enabled = [AnalystKind::Market, AnalystKind::News];
        let err = assemble(&completed_state(), &enabled, TradeSignal::Buy).unwrap_err();
        assert!(matches!(err, EngineError::MissingSection("news_report")));
    }

    #[test]
    fn test_missing_terminal_field_is_integrity_error() {
        let mut state = completed_state();
        state.trader_plan = None;

        let err = assemble(&state, &[AnalystKind::Market], TradeSignal::Buy).unwrap_err();
        assert!(matches!(err, EngineError::MissingSection("trader_plan")));
    }
}
