use std::sync::Arc;

use ezeval_config::FailurePolicy;
use ezeval_core::{EvalError, EvaluationRequest, EvaluationResult, ModelFailure, ModelOutcome};
use ezeval_llm::ChatProvider;
use futures::future::{join_all, try_join_all};
use tracing::{info, warn};

use crate::judge::Judge;
use crate::responder::Responder;

/// Runs responder and judge for every requested model.
///
/// Models are evaluated concurrently and joined before returning; output
/// order always matches request order.
pub struct Evaluator {
    responder: Responder,
    judge: Judge,
}

impl Evaluator {
    /// Uses one provider for both candidate and judge calls.
    pub fn new(provider: Arc<dyn ChatProvider>, judge_model: impl Into<String>) -> Self {
        Self {
            responder: Responder::new(Arc::clone(&provider)),
            judge: Judge::new(provider, judge_model),
        }
    }

    pub fn judge_model(&self) -> &str {
        self.judge.model()
    }

    /// Responder then judge for a single model.
    pub async fn evaluate_model(
        &self,
        request: &EvaluationRequest,
        model: &str,
    ) -> Result<EvaluationResult, EvalError> {
        let reply = self
            .responder
            .respond(model, &request.system_prompt, &request.user_prompt)
            .await?;

        let verdict = self
            .judge
            .judge(&request.system_prompt, &request.user_prompt, &reply.text)
            .await?;

        Ok(EvaluationResult::new(reply, verdict))
    }

    /// Evaluates every model in `request` under `policy`.
    ///
    /// Validation errors are returned before any provider call. Under
    /// [`FailurePolicy::Abort`] the first model error fails the whole call and
    /// in-flight sibling work is dropped. Under [`FailurePolicy::Isolate`] each
    /// model yields its own outcome.
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
        policy: FailurePolicy,
    ) -> Result<Vec<ModelOutcome>, EvalError> {
        request.validate()?;

        info!(
            "EVALUATOR: {} models, judge {}, policy {:?}",
            request.models.len(),
            self.judge.model(),
            policy
        );

        let outcomes: Vec<ModelOutcome> = match policy {
            FailurePolicy::Abort => {
                let futures = request.models.iter().map(|model| self.evaluate_model(request, model));
                try_join_all(futures)
                    .await
                    .inspect_err(|e| warn!("EVALUATOR: aborting request: {}", e))?
                    .into_iter()
                    .map(ModelOutcome::Success)
                    .collect()
            }
            FailurePolicy::Isolate => {
                let futures = request.models.iter().map(|model| async move {
                    match self.evaluate_model(request, model).await {
                        Ok(result) => ModelOutcome::Success(result),
                        Err(e) => {
                            warn!("EVALUATOR: {} failed: {}", model, e);
                            ModelOutcome::Failure(ModelFailure::new(model.as_str(), &e))
                        }
                    }
                });
                join_all(futures).await
            }
        };

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!("EVALUATOR: {}/{} models scored", succeeded, outcomes.len());

        Ok(outcomes)
    }
}
