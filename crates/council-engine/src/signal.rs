//! Decision signal extraction from free-text judge output
//!
//! Keyword precedence is a policy choice, not a language fact: when a text
//! ambiguously contains several action keywords, **Buy wins over Sell, and
//! anything without a buy or sell keyword resolves to Hold**. Hold is the
//! conservative default for keyword-free prose ("no strong signal either
//! way"); only empty or whitespace-only decision text is an error.

use crate::error::{EngineError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static BUY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbuy\b").expect("valid literal pattern"));
static SELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsell\b").expect("valid literal pattern"));

/// Normalized trading decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

impl TradeSignal {
    /// Extract the decision signal from the terminal free-text decision
    ///
    /// Matching is case-insensitive on whole-word keyword presence, with the
    /// documented precedence: `buy` is checked before `sell`, and text with
    /// neither keyword is `Hold`. Empty text yields
    /// [`EngineError::UnparseableDecision`].
    pub fn extract(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(EngineError::UnparseableDecision);
        }

        if BUY.is_match(text) {
            Ok(Self::Buy)
        } else if SELL.is_match(text) {
            Ok(Self::Sell)
        } else {
            Ok(Self::Hold)
        }
    }
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Hold => "Hold",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_extraction() {
        let signal = TradeSignal::extract("I recommend we BUY given strong momentum").unwrap();
        assert_eq!(signal, TradeSignal::Buy);
    }

    #[test]
    fn test_sell_extraction() {
        let signal = TradeSignal::extract("This is a clear SELL signal").unwrap();
        assert_eq!(signal, TradeSignal::Sell);
    }

    #[test]
    fn test_keyword_free_text_defaults_to_hold() {
        let signal = TradeSignal::extract("No strong signal either way").unwrap();
        assert_eq!(signal, TradeSignal::Hold);
    }

    #[test]
    fn test_conflicting_keywords_resolve_buy_first() {
        // Documented precedence: Buy is checked before Sell.
        let signal = TradeSignal::extract("sell vs buy: buy wins").unwrap();
        assert_eq!(signal, TradeSignal::Buy);
    }

    #[test]
    fn test_word_boundary_matching() {
        // "buyback" must not count as a buy keyword on its own.
        assert_eq!(
            TradeSignal::extract("a buyback program was announced").unwrap(),
            TradeSignal::Hold
        );
        assert_eq!(
            TradeSignal::extract("selling pressure from the buyback, but still: buy").unwrap(),
            TradeSignal::Buy
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            TradeSignal::extract("final answer: Sell.").unwrap(),
            TradeSignal::Sell
        );
    }

    #[test]
    fn test_empty_text_is_unparseable() {
        assert!(matches!(
            TradeSignal::extract("   "),
            Err(EngineError::UnparseableDecision)
        ));
        assert!(matches!(
            TradeSignal::extract(""),
            Err(EngineError::UnparseableDecision)
        ));
    }

    #[test]
    fn test_display_normalized_form() {
        assert_eq!(TradeSignal::Buy.to_string(), "Buy");
        assert_eq!(TradeSignal::Hold.to_string(), "Hold");
    }
}
