//! Reasoning-collaborator seam for council-rs
//!
//! Every deliberation stage talks to its reasoning service through the types
//! in this crate: a conversation model with a single tagged variant for tool
//! invocations, completion request/response types, and the [`LLMProvider`]
//! trait. Tool calls coming back from a provider are normalized into
//! [`ContentBlock::ToolUse`] exactly once, at the provider boundary, so no
//! downstream code ever re-discriminates wire shapes.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod tools;

pub use completion::{
    CompletionRequest, CompletionRequestBuilder, CompletionResponse, StopReason, TokenUsage,
};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use providers::{OpenAIConfig, OpenAIProvider};
pub use tools::ToolDefinition;
