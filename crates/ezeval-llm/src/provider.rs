//! Provider trait and completion types.

use async_trait::async_trait;
use ezeval_core::{EvalError, Message};

/// Token usage and timing metrics from an LLM call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmMetrics {
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Wall-clock time measured on our side of the call.
    pub elapsed_ms: u64,
}

/// Result of a single non-streaming chat completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatCompletion {
    /// First choice's message content, if any.
    pub content: Option<String>,
    /// Provider-reported completion time in milliseconds.
    ///
    /// [`LlmClient`](crate::LlmClient) fills this from Groq's
    /// `usage.completion_time`, which Groq reports in seconds, and scales it
    /// by 1000. Other providers may not report it at all; the value is then
    /// `None` and callers treat it as 0.
    pub completion_time_ms: Option<f64>,
    pub metrics: LlmMetrics,
}

/// A chat-completion backend.
///
/// Implementations must be shareable across the concurrent per-model
/// evaluations of a request.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends `messages` to `model` and returns the completion.
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<ChatCompletion, EvalError>;
}
