//! Evaluation engine for ezeval.
//!
//! - [`Responder`] — Sends the prompt pair to a candidate model
//! - [`Judge`] — Scores a reply with the fixed judge model
//! - [`Evaluator`] — Runs both for every requested model and collects outcomes
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ezeval_config::FailurePolicy;
//! use ezeval_engine::Evaluator;
//!
//! let evaluator = Evaluator::new(Arc::new(client), "llama-3.3-70b-versatile");
//! let outcomes = evaluator.evaluate(&request, FailurePolicy::Isolate).await?;
//! ```
//!
//! # Execution Model
//!
//! Per model, two provider calls run back to back: the candidate call, then
//! the judge call with the candidate's reply embedded. Different models are
//! driven concurrently within the request via `join_all` and joined before
//! the outcomes are returned in request order.

mod evaluator;
mod judge;
mod prompts;
mod responder;

pub use evaluator::Evaluator;
pub use judge::{parse_verdict, Judge};
pub use prompts::judge_prompt;
pub use responder::Responder;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use ezeval_core::{EvalError, Message};
    use ezeval_llm::{ChatCompletion, ChatProvider};

    type RespondFn = dyn Fn(&str, &[Message]) -> Result<ChatCompletion, EvalError> + Send + Sync;
    type DelayFn = dyn Fn(&str) -> Duration + Send + Sync;

    /// Deterministic provider driven by a closure.
    pub struct FnProvider {
        respond: Box<RespondFn>,
        delay: Box<DelayFn>,
        in_flight: AtomicUsize,
        pub calls: AtomicUsize,
        pub max_in_flight: AtomicUsize,
    }

    impl FnProvider {
        pub fn new<F>(respond: F) -> Self
        where
            F: Fn(&str, &[Message]) -> Result<ChatCompletion, EvalError> + Send + Sync + 'static,
        {
            Self {
                respond: Box::new(respond),
                delay: Box::new(|_: &str| Duration::ZERO),
                in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn with_delay<D>(mut self, delay: D) -> Self
        where
            D: Fn(&str) -> Duration + Send + Sync + 'static,
        {
            self.delay = Box::new(delay);
            self
        }
    }

    #[async_trait]
    impl ChatProvider for FnProvider {
        async fn complete(&self, model: &str, messages: &[Message]) -> Result<ChatCompletion, EvalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = (self.delay)(model);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            (self.respond)(model, messages)
        }
    }
}
