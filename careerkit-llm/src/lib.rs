//! # careerkit LLM
//!
//! Thin client layer between the crew and a hosted chat-completions API.
//!
//! ## Core Concepts
//! - **Provider**: Trait-based LLM communication (`LlmProvider`)
//! - **OpenAI-compatible**: one HTTP implementation covering Groq, OpenAI and local servers
//! - **Credentials**: carried per request as an [`ApiKey`], never read from the environment here
//! - **Usage**: token accounting across the calls of a run

pub mod provider;

pub use provider::{
    ApiKey, ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
    OpenAIProvider, ProviderConfig, ProviderError, ProviderType, Role, Usage, UsageTracker,
};

#[cfg(any(test, feature = "testing"))]
pub use provider::ScriptedProvider;
