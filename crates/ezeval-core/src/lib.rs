//! Core domain types and error definitions for ezeval.
//!
//! This crate provides the fundamental types shared across the ezeval workspace:
//!
//! - [`EvalError`] — Error type for provider calls, judge parsing and validation
//! - [`Message`] and [`MessageRole`] — Chat message types sent to a provider
//! - [`EvaluationRequest`] — A prompt pair plus the models to evaluate
//! - [`ModelReply`], [`JudgeVerdict`], [`EvaluationResult`] — Per-model outputs
//! - [`ModelOutcome`] — A result or a per-model failure marker
//!
//! # Example
//!
//! ```rust
//! use ezeval_core::EvaluationRequest;
//!
//! let request = EvaluationRequest {
//!     system_prompt: "You are terse.".to_string(),
//!     user_prompt: "Say hi.".to_string(),
//!     models: vec!["gemma2-9b-it".to_string()],
//! };
//! assert!(request.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while evaluating models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Network or provider failure on a chat completion call.
    #[error("Provider request failed: {0}")]
    Transport(String),

    /// Judge output did not match the score/reasoning shape.
    #[error("Failed to parse judge output: {0}")]
    Parse(String),

    /// The request was rejected before any provider call.
    #[error("Invalid request: {0}")]
    Validation(String),
}

impl EvalError {
    /// Short machine-readable label used in per-model failure markers.
    pub fn kind(&self) -> FailureKind {
        match self {
            EvalError::Transport(_) => FailureKind::Transport,
            EvalError::Parse(_) => FailureKind::Parse,
            EvalError::Validation(_) => FailureKind::Validation,
        }
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::Parse(err.to_string())
    }
}

/// Category of a failed model evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Transport,
    Parse,
    Validation,
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions framing the conversation.
    System,
    /// Message from the user.
    User,
}

/// A single chat message sent to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
}

impl Message {
    /// Creates a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into() }
    }

    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }
}

/// A prompt pair to send to every listed model.
///
/// Built per HTTP call and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub models: Vec<String>,
}

impl EvaluationRequest {
    /// Rejects empty model lists and blank model identifiers.
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.models.is_empty() {
            return Err(EvalError::Validation("at least one model is required".into()));
        }
        if let Some(idx) = self.models.iter().position(|m| m.trim().is_empty()) {
            return Err(EvalError::Validation(format!("model at index {idx} is blank")));
        }
        Ok(())
    }
}

/// A candidate model's reply to the prompt pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub model_id: String,
    /// First choice content, empty when the provider returned none.
    pub text: String,
    /// Provider-reported completion time, 0 when not reported.
    pub completion_time_ms: f64,
}

/// The judge model's score and explanation for one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeVerdict {
    /// Always within `0..=100`.
    pub score: u8,
    pub reasoning: String,
}

/// One model's complete scored outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub model: String,
    pub llm_response: String,
    pub evaluator_response: String,
    pub score: u8,
    pub response_time: f64,
}

impl EvaluationResult {
    /// Combines a reply and its verdict.
    pub fn new(reply: ModelReply, verdict: JudgeVerdict) -> Self {
        Self {
            model: reply.model_id,
            llm_response: reply.text,
            evaluator_response: verdict.reasoning,
            score: verdict.score,
            response_time: reply.completion_time_ms,
        }
    }
}

/// Details of a failed model evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub kind: FailureKind,
    pub message: String,
}

/// Marker for a model whose evaluation failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFailure {
    pub model: String,
    pub error: FailureDetail,
}

impl ModelFailure {
    pub fn new(model: impl Into<String>, err: &EvalError) -> Self {
        Self {
            model: model.into(),
            error: FailureDetail { kind: err.kind(), message: err.to_string() },
        }
    }
}

/// Outcome of evaluating a single model.
///
/// Serializes as the bare result or failure object, so a list of outcomes
/// where everything succeeded is indistinguishable from a list of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelOutcome {
    Success(EvaluationResult),
    Failure(ModelFailure),
}

impl ModelOutcome {
    /// Model identifier this outcome belongs to.
    pub fn model(&self) -> &str {
        match self {
            ModelOutcome::Success(r) => &r.model,
            ModelOutcome::Failure(f) => &f.model,
        }
    }

    /// Score of a successful evaluation.
    pub fn score(&self) -> Option<u8> {
        match self {
            ModelOutcome::Success(r) => Some(r.score),
            ModelOutcome::Failure(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ModelOutcome::Success(_))
    }
}

/// Orders outcomes by descending score, failures last.
///
/// The sort is stable: equal scores keep request order.
pub fn rank_outcomes(mut outcomes: Vec<ModelOutcome>) -> Vec<ModelOutcome> {
    outcomes.sort_by_key(|o| std::cmp::Reverse(o.score().map(i16::from).unwrap_or(-1)));
    outcomes
}
