//! Tool definitions advertised to the LLM

use serde::{Deserialize, Serialize};

/// Definition of a tool the LLM may call
///
/// The `input_schema` is a JSON Schema object describing the parameters the
/// tool expects; the LLM uses it to generate valid invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (unique within a request)
    pub name: String,

    /// Description that helps the LLM decide when to call this tool
    pub description: String,

    /// JSON Schema for the tool's input
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
