//! Idempotent completion tracking over the snapshot stream
//!
//! The pipeline emits the entire cumulative state after every stage, so a
//! naive "field is non-empty" check would re-announce every completed field
//! on every subsequent snapshot. The tracker keeps a value-versioned map
//! (field path -> last reported value) and fires once per once-only field,
//! or once per *distinct* value for the multi-round risk-debate fields. A
//! round that repeats the previous value verbatim never re-fires.

use crate::state::AnalysisState;
use std::collections::HashMap;

/// Completion policy for a tracked field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPolicy {
    /// Fires exactly once for the whole run, on first non-empty value
    Once,

    /// Fires on every transition to a value different from the last
    /// reported one
    PerValue,
}

/// A field-completed notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEvent {
    /// Dotted field path within the analysis state
    pub path: &'static str,

    /// Human-readable banner for the console/log channel
    pub label: &'static str,

    /// The value that triggered the event
    pub value: String,
}

struct TrackedField {
    path: &'static str,
    label: &'static str,
    policy: TrackPolicy,
}

/// Observes cumulative snapshots and emits each completion exactly once
pub struct CompletionTracker {
    fields: Vec<TrackedField>,
    reported: HashMap<&'static str, String>,
}

impl CompletionTracker {
    /// Tracker over the standard deliberation field set
    pub fn new() -> Self {
        use TrackPolicy::{Once, PerValue};

        let fields = vec![
            TrackedField {
                path: "market_report",
                label: "Market Analysis Completed",
                policy: Once,
            },
            TrackedField {
                path: "sentiment_report",
                label: "Sentiment Analysis Completed",
                policy: Once,
            },
            TrackedField {
                path: "news_report",
                label: "News Analysis Completed",
                policy: Once,
            },
            TrackedField {
                path: "fundamentals_report",
                label: "Fundamentals Analysis Completed",
                policy: Once,
            },
            TrackedField {
                path: "investment_debate.bull_history",
                label: "Research Team Debate - Bull (In Progress)",
                policy: PerValue,
            },
            TrackedField {
                path: "investment_debate.bear_history",
                label: "Research Team Debate - Bear (In Progress)",
                policy: PerValue,
            },
            TrackedField {
                path: "investment_debate.judge_decision",
                label: "Research Team Debate Completed",
                policy: Once,
            },
            TrackedField {
                path: "trader_plan",
                label: "Trader Investment Planning Completed",
                policy: Once,
            },
            TrackedField {
                path: "risk_debate.current_risky_response",
                label: "Risk Discussion - Risky (In Progress)",
                policy: PerValue,
            },
            TrackedField {
                path: "risk_debate.current_safe_response",
                label: "Risk Discussion - Safe (In Progress)",
                policy: PerValue,
            },
            TrackedField {
                path: "risk_debate.current_neutral_response",
                label: "Risk Discussion - Neutral (In Progress)",
                policy: PerValue,
            },
            TrackedField {
                path: "risk_debate.judge_decision",
                label: "Risk Discussion Completed",
                policy: Once,
            },
            TrackedField {
                path: "final_trade_decision",
                label: "Final Trade Decision Ready",
                policy: Once,
            },
        ];

        Self {
            fields,
            reported: HashMap::new(),
        }
    }

    /// Observe one cumulative snapshot; returns zero or more new events
    ///
    /// Never mutates the state it observes. Replaying an already-seen
    /// snapshot yields no events.
    pub fn observe(&mut self, snapshot: &AnalysisState) -> Vec<FieldEvent> {
        let mut events = Vec::new();

        for field in &self.fields {
            let Some(value) = snapshot.field(field.path) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            let fires = match field.policy {
                TrackPolicy::Once => !self.reported.contains_key(field.path),
                TrackPolicy::PerValue => {
                    self.reported.get(field.path).map(String::as_str) != Some(value)
                }
            };

            if fires {
                self.reported.insert(field.path, value.to_string());
                events.push(FieldEvent {
                    path: field.path,
                    label: field.label,
                    value: value.to_string(),
                });
            }
        }

        events
    }
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateUpdate;
    use chrono::NaiveDate;

    fn state() -> AnalysisState {
        AnalysisState::new(
            "BTC",
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            "",
            vec![],
        )
    }

    fn paths(events: &[FieldEvent]) -> Vec<&'static str> {
        events.iter().map(|e| e.path).collect()
    }

    #[test]
    fn test_once_only_field_fires_exactly_once() {
        let mut tracker = CompletionTracker::new();
        let mut s = state();

        s.apply(StateUpdate {
            market_report: Some("bullish breakout".to_string()),
            ..Default::default()
        });

        // Snapshot k: the field was just set.
        assert_eq!(paths(&tracker.observe(&s)), vec!["market_report"]);

        // Snapshots k+1..n repeat the unchanged value - no further events.
        for _ in 0..5 {
            assert!(tracker.observe(&s).is_empty());
        }
    }

    #[test]
    fn test_multi_round_field_fires_per_distinct_value() {
        let mut tracker = CompletionTracker::new();
        let mut s = state();
        let mut fired = 0;

        for value in ["A", "A", "B", "B", "C"] {
            s.apply(StateUpdate {
                risky_response: Some(value.to_string()),
                ..Default::default()
            });
            fired += tracker.observe(&s).len();
        }

        // "A", "B", "C" - never a repeat of the immediately preceding value.
        assert_eq!(fired, 3);
    }

    #[test]
    fn test_empty_value_is_not_a_completion() {
        let mut tracker = CompletionTracker::new();
        let mut s = state();

        s.apply(StateUpdate {
            news_report: Some(String::new()),
            ..Default::default()
        });

        assert!(tracker.observe(&s).is_empty());
    }

    #[test]
    fn test_replaying_terminal_snapshot_is_idempotent() {
        let mut tracker = CompletionTracker::new();
        let mut s = state();

        s.apply(StateUpdate {
            market_report: Some("bullish".to_string()),
            sentiment_report: Some("neutral".to_string()),
            investment_judge_decision: Some("buy small".to_string()),
            trader_plan: Some("scale in".to_string()),
            risky_response: Some("lever up".to_string()),
            safe_response: Some("stay light".to_string()),
            neutral_response: Some("split the difference".to_string()),
            risk_judge_decision: Some("approved with limits".to_string()),
            final_trade_decision: Some("Final recommendation: BUY".to_string()),
            ..Default::default()
        });

        let first = tracker.observe(&s);
        assert_eq!(first.len(), 9);

        // Replay: zero new events the second time.
        assert!(tracker.observe(&s).is_empty());
    }

    #[test]
    fn test_events_carry_label_and_value() {
        let mut tracker = CompletionTracker::new();
        let mut s = state();

        s.apply(StateUpdate {
            fundamentals_report: Some("undervalued".to_string()),
            ..Default::default()
        });

        let events = tracker.observe(&s);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, "Fundamentals Analysis Completed");
        assert_eq!(events[0].value, "undervalued");
    }

    #[test]
    fn test_distinct_fields_do_not_interfere() {
        let mut tracker = CompletionTracker::new();
        let mut s = state();

        s.apply(StateUpdate {
            risky_response: Some("push harder".to_string()),
            ..Default::default()
        });
        assert_eq!(
            paths(&tracker.observe(&s)),
            vec!["risk_debate.current_risky_response"]
        );

        // A safe response arriving later does not re-fire the risky one.
        s.apply(StateUpdate {
            safe_response: Some("trim exposure".to_string()),
            ..Default::default()
        });
        assert_eq!(
            paths(&tracker.observe(&s)),
            vec!["risk_debate.current_safe_response"]
        );
    }
}
