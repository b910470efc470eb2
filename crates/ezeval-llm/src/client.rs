//! OpenAI-compatible chat client.
//!
//! Request bodies are built with `async-openai`'s request types and sent with
//! `reqwest`, so provider extensions in the response (Groq's
//! `usage.completion_time`) survive deserialization.

use std::time::{Duration, Instant};

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use ezeval_core::{EvalError, Message, MessageRole};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::provider::{ChatCompletion, ChatProvider, LlmMetrics};

/// Converts any error into an EvalError::Transport.
fn llm_err(e: impl ToString) -> EvalError {
    EvalError::Transport(e.to_string())
}

/// Maps domain messages onto the OpenAI request message types.
fn build_messages(messages: &[Message]) -> Result<Vec<ChatCompletionRequestMessage>, EvalError> {
    messages
        .iter()
        .map(|msg| {
            Ok(match msg.role {
                MessageRole::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(msg.content.as_str())
                        .build()
                        .map_err(llm_err)?,
                ),
                MessageRole::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(msg.content.as_str())
                        .build()
                        .map_err(llm_err)?,
                ),
            })
        })
        .collect()
}

fn build_request(model: &str, messages: &[Message]) -> Result<CreateChatCompletionRequest, EvalError> {
    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(build_messages(messages)?)
        .build()
        .map_err(llm_err)
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    /// Seconds (Groq extension).
    #[serde(default)]
    completion_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Extracts content, reported timing and metrics from a completion body.
fn extract_completion(body: CompletionBody, elapsed_ms: u64) -> ChatCompletion {
    let content = body.choices.into_iter().next().and_then(|c| c.message.content);

    let (input_tokens, output_tokens, completion_time) = body
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens, u.completion_time))
        .unwrap_or((0, 0, None));

    let completion_time_ms = completion_time
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs * 1000.0);

    info!(
        "LLM: {}ms, tokens: {}/{} (in/out)",
        elapsed_ms, input_tokens, output_tokens
    );

    ChatCompletion {
        content,
        completion_time_ms,
        metrics: LlmMetrics { input_tokens, output_tokens, elapsed_ms },
    }
}

/// Client for OpenAI-compatible chat completion APIs.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_base: String,
    api_key: String,
}

impl LlmClient {
    /// Creates a client for `api_base` (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(api_base: &str, api_key: &str, timeout: Duration) -> Result<Self, EvalError> {
        let http = Client::builder().timeout(timeout).build().map_err(llm_err)?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl ChatProvider for LlmClient {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<ChatCompletion, EvalError> {
        let start = Instant::now();
        let request = build_request(model, messages)?;

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EvalError::Transport(format!("{model}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(EvalError::Transport(format!("{model}: {status}: {message}")));
        }

        let body: CompletionBody = response
            .json()
            .await
            .map_err(|e| EvalError::Transport(format!("{model}: invalid completion body: {e}")))?;
        debug!("Completion from {}: {} choices", model, body.choices.len());

        Ok(extract_completion(body, start.elapsed().as_millis() as u64))
    }
}
