//! Data tools the analyst stages may call

mod market_data;
mod news;

pub use market_data::MarketCandlesTool;
pub use news::NewsHeadlinesTool;

use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools an analyst stage can execute
///
/// Each tool provides a name, a description, and a JSON Schema for its
/// input; the executor advertises these to the LLM and dispatches
/// invocations by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    async fn execute(&self, params: Value) -> anyhow::Result<Value>;

    /// Tool name (must be unique within a stage)
    fn name(&self) -> &str;

    /// Description that helps the LLM decide when to call this tool
    fn description(&self) -> &str;

    /// JSON Schema describing the tool input
    fn input_schema(&self) -> Value;
}
