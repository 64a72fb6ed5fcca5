//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for reasoning-service providers
///
/// Implementations provide access to a chat-completion service. The rest of
/// the system treats a provider as an opaque collaborator: it receives the
/// full conversation plus tool definitions and returns a single assistant
/// message.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;
}
