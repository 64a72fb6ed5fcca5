//! Shared rendering of state context into stage inputs

use council_engine::AnalysisState;

/// The operator's preferences block, or a placeholder when empty
pub(crate) fn preferences_block(state: &AnalysisState) -> String {
    if state.investment_preferences.trim().is_empty() {
        "(none provided)".to_string()
    } else {
        state.investment_preferences.clone()
    }
}

/// Supplementary reports supplied at run start, order-preserving
pub(crate) fn external_reports_block(state: &AnalysisState) -> String {
    if state.external_reports.is_empty() {
        return String::new();
    }

    let mut out = String::from("\nSupplementary reports provided by the operator:\n");
    for (i, report) in state.external_reports.iter().enumerate() {
        out.push_str(&format!("--- supplementary report {} ---\n{}\n", i + 1, report));
    }
    out
}

/// Digest of every analyst report currently present in the state
pub(crate) fn analyst_digest(state: &AnalysisState) -> String {
    let mut out = String::new();
    let sections = [
        ("Market report", &state.market_report),
        ("Sentiment report", &state.sentiment_report),
        ("News report", &state.news_report),
        ("Fundamentals report", &state.fundamentals_report),
    ];

    for (title, body) in sections {
        if let Some(text) = body {
            if !text.is_empty() {
                out.push_str(&format!("## {title}\n{text}\n\n"));
            }
        }
    }

    if out.is_empty() {
        out.push_str("(no analyst reports available)\n");
    }
    out
}
