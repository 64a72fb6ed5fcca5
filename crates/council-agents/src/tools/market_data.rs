//! Daily candle data from the Binance public API

use super::Tool;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.binance.com";
const DEFAULT_LIMIT: u32 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fetches recent daily OHLCV candles for a symbol
///
/// Uses the public klines endpoint (no API key). The symbol is quoted
/// against USDT, e.g. asset "BTC" queries "BTCUSDT".
pub struct MarketCandlesTool {
    client: reqwest::Client,
    api_base: String,
}

impl MarketCandlesTool {
    /// Create a tool against the default public endpoint
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Create a tool against a custom endpoint (mirrors, test servers)
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            api_base: api_base.into(),
        }
    }
}

impl Default for MarketCandlesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for MarketCandlesTool {
    async fn execute(&self, params: Value) -> anyhow::Result<Value> {
        let asset = params["asset"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing required parameter: asset"))?
            .to_uppercase();
        let limit = params["days"].as_u64().map_or(DEFAULT_LIMIT, |d| d as u32);

        let symbol = format!("{asset}USDT");
        debug!(symbol, limit, "fetching daily candles");

        let raw: Value = self
            .client
            .get(format!("{}/api/v3/klines", self.api_base))
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", "1d"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let summary = summarize_klines(&symbol, &raw)?;
        Ok(json!({ "symbol": symbol, "summary": summary }))
    }

    fn name(&self) -> &str {
        "market_candles"
    }

    fn description(&self) -> &str {
        "Fetch recent daily OHLCV candles for an asset (quoted against USDT) \
         with a compact price and volume summary"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "asset": {
                    "type": "string",
                    "description": "Asset ticker, e.g. BTC"
                },
                "days": {
                    "type": "integer",
                    "description": "Number of daily candles to fetch (default 30)"
                }
            },
            "required": ["asset"]
        })
    }
}

/// Summarize a raw klines response into a text block for the LLM
///
/// The wire format is an array of arrays:
/// `[open_time, open, high, low, close, volume, ...]` with prices as
/// strings.
fn summarize_klines(symbol: &str, raw: &Value) -> anyhow::Result<String> {
    let rows = raw
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("unexpected klines response shape"))?;
    if rows.is_empty() {
        anyhow::bail!("no candle data returned for {symbol}");
    }

    let mut closes = Vec::with_capacity(rows.len());
    let mut high = f64::MIN;
    let mut low = f64::MAX;
    let mut volume = 0.0;

    for row in rows {
        let cells = row
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("unexpected candle row shape"))?;
        closes.push(parse_cell(cells, 4)?);
        high = high.max(parse_cell(cells, 2)?);
        low = low.min(parse_cell(cells, 3)?);
        volume += parse_cell(cells, 5)?;
    }

    let first = closes[0];
    let last = closes[closes.len() - 1];
    let change_pct = (last - first) / first * 100.0;

    Ok(format!(
        "{symbol}, last {n} daily candles:\n\
         close: {last:.2} ({change_pct:+.2}% over the window)\n\
         range: {low:.2} - {high:.2}\n\
         total volume: {volume:.2}\n\
         closes: {closes}",
        n = closes.len(),
        closes = closes
            .iter()
            .map(|c| format!("{c:.2}"))
            .collect::<Vec<_>>()
            .join(", "),
    ))
}

fn parse_cell(cells: &[Value], index: usize) -> anyhow::Result<f64> {
    let cell = cells
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("candle row too short"))?;
    match cell {
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|e| anyhow::anyhow!("bad numeric cell: {e}")),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("bad numeric cell")),
        _ => anyhow::bail!("unexpected cell type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_klines() -> Value {
        json!([
            [1717286400000u64, "67000.0", "69500.0", "66800.0", "69000.0", "1200.5", 0, "0", 0, "0", "0", "0"],
            [1717372800000u64, "69000.0", "70200.0", "68500.0", "70000.0", "980.25", 0, "0", 0, "0", "0", "0"]
        ])
    }

    #[test]
    fn test_summarize_klines() {
        let summary = summarize_klines("BTCUSDT", &sample_klines()).unwrap();

        assert!(summary.contains("BTCUSDT"));
        assert!(summary.contains("close: 70000.00"));
        assert!(summary.contains("range: 66800.00 - 70200.00"));
        assert!(summary.contains("69000.00, 70000.00"));
    }

    #[test]
    fn test_summarize_rejects_empty_response() {
        assert!(summarize_klines("BTCUSDT", &json!([])).is_err());
        assert!(summarize_klines("BTCUSDT", &json!({"error": "down"})).is_err());
    }

    #[test]
    fn test_schema_requires_asset() {
        let tool = MarketCandlesTool::new();
        let schema = tool.input_schema();
        assert_eq!(schema["required"][0], "asset");
        assert_eq!(tool.name(), "market_candles");
    }
}
