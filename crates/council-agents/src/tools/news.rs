//! Recent news headlines from the CryptoCompare public API

use super::Tool;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://min-api.cryptocompare.com";
const DEFAULT_LIMIT: usize = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fetches recent news headlines for an asset category
pub struct NewsHeadlinesTool {
    client: reqwest::Client,
    api_base: String,
}

impl NewsHeadlinesTool {
    /// Create a tool against the default public endpoint
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Create a tool against a custom endpoint
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

impl Default for NewsHeadlinesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for NewsHeadlinesTool {
    async fn execute(&self, params: Value) -> anyhow::Result<Value> {
        let asset = params["asset"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing required parameter: asset"))?
            .to_uppercase();
        let limit = params["limit"]
            .as_u64()
            .map_or(DEFAULT_LIMIT, |l| l as usize);

        debug!(asset, limit, "fetching news headlines");

        let raw: Value = self
            .client
            .get(format!("{}/data/v2/news/", self.api_base))
            .query(&[("categories", asset.as_str()), ("lang", "EN")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let digest = format_headlines(&asset, &raw, limit)?;
        Ok(json!({ "asset": asset, "headlines": digest }))
    }

    fn name(&self) -> &str {
        "news_headlines"
    }

    fn description(&self) -> &str {
        "Fetch recent English-language news headlines for an asset, newest \
         first, with source attribution"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "asset": {
                    "type": "string",
                    "description": "Asset ticker used as the news category, e.g. BTC"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of headlines (default 10)"
                }
            },
            "required": ["asset"]
        })
    }
}

/// Format the news response into a headline digest for the LLM
fn format_headlines(asset: &str, raw: &Value, limit: usize) -> anyhow::Result<String> {
    let items = raw["Data"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("unexpected news response shape"))?;

    if items.is_empty() {
        return Ok(format!("No recent headlines found for {asset}."));
    }

    let lines: Vec<String> = items
        .iter()
        .take(limit)
        .map(|item| {
            let title = item["title"].as_str().unwrap_or("(untitled)");
            let source = item["source_info"]["name"]
                .as_str()
                .unwrap_or("unknown source");
            format!("- {title} ({source})")
        })
        .collect();

    Ok(format!(
        "Recent headlines for {asset}:\n{}",
        lines.join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_news() -> Value {
        json!({
            "Data": [
                {
                    "title": "ETF inflows hit a monthly high",
                    "source_info": { "name": "CoinWire" },
                    "published_on": 1717286400
                },
                {
                    "title": "Exchange reserves keep falling",
                    "source_info": { "name": "BlockBeat" },
                    "published_on": 1717200000
                }
            ]
        })
    }

    #[test]
    fn test_format_headlines() {
        let digest = format_headlines("BTC", &sample_news(), 10).unwrap();

        assert!(digest.contains("Recent headlines for BTC"));
        assert!(digest.contains("- ETF inflows hit a monthly high (CoinWire)"));
        assert!(digest.contains("(BlockBeat)"));
    }

    #[test]
    fn test_format_headlines_respects_limit() {
        let digest = format_headlines("BTC", &sample_news(), 1).unwrap();
        assert!(digest.contains("ETF inflows"));
        assert!(!digest.contains("Exchange reserves"));
    }

    #[test]
    fn test_empty_feed_is_not_an_error() {
        let digest = format_headlines("BTC", &json!({"Data": []}), 5).unwrap();
        assert!(digest.contains("No recent headlines"));
    }

    #[test]
    fn test_malformed_feed_is_an_error() {
        assert!(format_headlines("BTC", &json!({"Message": "err"}), 5).is_err());
    }
}
