use std::sync::Arc;

use ezeval_core::{EvalError, Message, ModelReply};
use ezeval_llm::ChatProvider;
use tracing::info;

/// Sends the user's prompt pair to a candidate model.
pub struct Responder {
    provider: Arc<dyn ChatProvider>,
}

impl Responder {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Runs one single-turn chat against `model`.
    pub async fn respond(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<ModelReply, EvalError> {
        info!("RESPONDER: Calling {}", model);

        let messages = [Message::system(system_prompt), Message::user(user_prompt)];
        let completion = self.provider.complete(model, &messages).await?;

        let reply = ModelReply {
            model_id: model.to_string(),
            text: completion.content.unwrap_or_default(),
            completion_time_ms: completion.completion_time_ms.unwrap_or(0.0),
        };

        info!(
            "RESPONDER: {} replied ({} chars, {}ms reported)",
            model,
            reply.text.len(),
            reply.completion_time_ms
        );

        Ok(reply)
    }
}
