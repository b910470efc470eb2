//! Chat completion access for ezeval.
//!
//! - [`ChatProvider`] — The seam the evaluation engine talks to
//! - [`LlmClient`] — OpenAI-compatible implementation (Groq by default)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use ezeval_core::Message;
//! use ezeval_llm::{ChatProvider, LlmClient};
//!
//! let client = LlmClient::new("https://api.groq.com/openai/v1", "gsk-...", Duration::from_secs(60))?;
//! let completion = client
//!     .complete("gemma2-9b-it", &[Message::system("Be terse."), Message::user("Hi")])
//!     .await?;
//! println!("{}", completion.content.unwrap_or_default());
//! ```

mod client;
mod provider;

pub use client::LlmClient;
pub use provider::{ChatCompletion, ChatProvider, LlmMetrics};
