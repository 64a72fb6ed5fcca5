//! LLM loop shared by all deliberation stages
//!
//! One stage invocation is: call the provider with the stage conversation
//! and available tools, check the stop reason, execute any requested tools
//! and loop back, and return the final text once the model completes
//! naturally. Iterations are bounded; exceeding the bound is a stage
//! failure, not a silent truncation.

use crate::config::CouncilConfig;
use crate::tools::Tool;
use council_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, StopReason, ToolDefinition,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Conversation produced by one stage invocation
#[derive(Debug)]
pub struct StageTranscript {
    /// Final assistant text (the stage's content output)
    pub final_text: String,

    /// All new conversation turns, seed message included
    pub messages: Vec<Message>,
}

/// Executes the call-LLM / run-tools loop for a stage
pub struct StageExecutor {
    provider: Arc<dyn LLMProvider>,
    tools: Vec<Arc<dyn Tool>>,
    model: String,
    max_tokens: usize,
    temperature: f32,
    max_iterations: usize,
}

impl StageExecutor {
    /// Create an executor without tools
    pub fn new(provider: Arc<dyn LLMProvider>, config: &CouncilConfig) -> Self {
        Self {
            provider,
            tools: Vec::new(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_iterations: config.max_tool_iterations,
        }
    }

    /// Attach the tools this stage may call
    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    /// Run the loop until the model completes naturally
    pub async fn run(
        &self,
        system_prompt: &str,
        user_input: String,
    ) -> anyhow::Result<StageTranscript> {
        let mut conversation = vec![Message::user(user_input)];

        for iteration in 1..=self.max_iterations {
            debug!(iteration, max = self.max_iterations, "stage iteration");

            let mut builder = CompletionRequest::builder(&self.model)
                .messages(conversation.clone())
                .system(system_prompt)
                .max_tokens(self.max_tokens)
                .temperature(self.temperature);

            if !self.tools.is_empty() {
                builder = builder.tools(self.tool_definitions());
            }

            let response = self.provider.complete(builder.build()).await?;
            conversation.push(response.message.clone());

            match response.stop_reason {
                StopReason::ToolUse => {
                    let results = self.execute_tools(&response.message).await?;
                    if results.is_empty() {
                        anyhow::bail!("tool use requested but no tool calls found");
                    }
                    conversation.extend(results);
                }
                StopReason::EndTurn => {
                    let final_text = response
                        .message
                        .text()
                        .unwrap_or_default()
                        .to_string();
                    return Ok(StageTranscript {
                        final_text,
                        messages: conversation,
                    });
                }
                StopReason::MaxTokens => {
                    warn!("completion truncated at max tokens");
                    let final_text = response
                        .message
                        .text()
                        .unwrap_or_default()
                        .to_string();
                    return Ok(StageTranscript {
                        final_text,
                        messages: conversation,
                    });
                }
            }
        }

        anyhow::bail!(
            "stage did not complete within {} tool iterations",
            self.max_iterations
        )
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Execute every tool invocation in an assistant message
    async fn execute_tools(&self, message: &Message) -> anyhow::Result<Vec<Message>> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            if let ContentBlock::ToolUse { id, name, input } = tool_use {
                info!("tool call: {} with args: {}", name, input);

                let tool = self
                    .tools
                    .iter()
                    .find(|t| t.name() == name.as_str())
                    .ok_or_else(|| anyhow::anyhow!("tool not found: {name}"))?;

                match tool.execute(input.clone()).await {
                    Ok(result) => {
                        let result_str = serde_json::to_string(&result)
                            .unwrap_or_else(|_| result.to_string());
                        results.push(Message::tool_result(id.clone(), result_str));
                    }
                    Err(e) => {
                        warn!("tool {} execution failed: {}", name, e);
                        results.push(Message::tool_error(id.clone(), format!("Error: {e}")));
                    }
                }
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use council_llm::{CompletionResponse, MessageContent, Result as LlmResult, Role, TokenUsage};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Provider that replays a scripted sequence of responses
    struct ScriptedProvider {
        responses: Mutex<Vec<CompletionResponse>>,
    }

    impl ScriptedProvider {
        fn new(mut responses: Vec<CompletionResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, _request: CompletionRequest) -> LlmResult<CompletionResponse> {
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop()
                .expect("script exhausted"))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        async fn execute(&self, params: Value) -> anyhow::Result<Value> {
            Ok(json!({ "echo": params }))
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    fn text_response(text: &str, stop_reason: StopReason) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            },
        }
    }

    fn tool_use_response() -> CompletionResponse {
        CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "echo".to_string(),
                    input: json!({"asset": "BTC"}),
                }])),
            },
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            },
        }
    }

    #[tokio::test]
    async fn test_plain_completion() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response(
            "momentum looks strong",
            StopReason::EndTurn,
        )]));
        let executor = StageExecutor::new(provider, &CouncilConfig::default());

        let transcript = executor
            .run("You are a market analyst", "Analyze BTC".to_string())
            .await
            .unwrap();

        assert_eq!(transcript.final_text, "momentum looks strong");
        // Seed user message plus one assistant turn.
        assert_eq!(transcript.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_tool_loop_roundtrip() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_use_response(),
            text_response("data in hand, looks bullish", StopReason::EndTurn),
        ]));
        let executor = StageExecutor::new(provider, &CouncilConfig::default())
            .with_tools(vec![Arc::new(EchoTool)]);

        let transcript = executor
            .run("You are a market analyst", "Analyze BTC".to_string())
            .await
            .unwrap();

        assert_eq!(transcript.final_text, "data in hand, looks bullish");
        // user + assistant(tool use) + tool result + assistant(final)
        assert_eq!(transcript.messages.len(), 4);
        assert!(transcript.messages[1].has_tool_uses());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error() {
        let provider = Arc::new(ScriptedProvider::new(vec![tool_use_response()]));
        // No tools attached, so the requested "echo" cannot be resolved.
        let executor = StageExecutor::new(provider, &CouncilConfig::default())
            .with_tools(vec![]);

        // With no tools the request carries no definitions, but a scripted
        // provider may still answer with a tool call.
        let err = executor
            .run("system", "input".to_string())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("tool not found"));
    }

    #[tokio::test]
    async fn test_iteration_bound() {
        let config = CouncilConfig::builder()
            .max_tool_iterations(2)
            .build()
            .unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_use_response(),
            tool_use_response(),
        ]));
        let executor =
            StageExecutor::new(provider, &config).with_tools(vec![Arc::new(EchoTool)]);

        let err = executor
            .run("system", "input".to_string())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("did not complete within"));
    }
}
