//! Test-only scripted provider shared across stage tests

use async_trait::async_trait;
use council_llm::{
    CompletionRequest, CompletionResponse, LLMProvider, Message, Result as LlmResult, StopReason,
    TokenUsage,
};
use std::sync::{Arc, Mutex};

/// Provider that replays canned assistant texts in order
pub(crate) struct ScriptedProvider {
    responses: Mutex<Vec<String>>,
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, _request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let text = self
            .responses
            .lock()
            .unwrap()
            .pop()
            .expect("script exhausted");
        Ok(CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage {
                input_tokens: 1,
                output_tokens: 1,
            },
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Build a provider that answers with `texts`, in order
pub(crate) fn scripted_provider(texts: Vec<&str>) -> Arc<dyn LLMProvider> {
    let mut responses: Vec<String> = texts.into_iter().map(str::to_string).collect();
    responses.reverse();
    Arc::new(ScriptedProvider {
        responses: Mutex::new(responses),
    })
}
