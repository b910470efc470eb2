//! Evaluation endpoint: fan a prompt pair out to models and score the replies.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use ezeval_core::{rank_outcomes, EvaluationRequest, ModelOutcome};
use tracing::{info, warn};

use crate::dto::{EvaluateQuery, SortOrder};
use crate::error::AppError;
use crate::ServerState;

const PROMPT_PREVIEW_CHARS: usize = 50;

/// Evaluates every requested model and returns one outcome per model.
///
/// The body is decoded as JSON whatever its `Content-Type`, since browser
/// clients posting a plain string send `text/plain`.
pub async fn evaluate(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<EvaluateQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Json<Vec<ModelOutcome>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let req: EvaluationRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected evaluate body: {}", e);
        AppError::BadRequest(format!("Invalid request body: {e}"))
    })?;

    info!(
        "Evaluate request ({} models): {}...",
        req.models.len(),
        prompt_preview(&req.user_prompt)
    );

    let outcomes = state
        .evaluator
        .evaluate(&req, state.settings.failure_policy)
        .await?;

    let outcomes = match query.sort {
        Some(SortOrder::Score) => rank_outcomes(outcomes),
        None => outcomes,
    };

    Ok(Json(outcomes))
}

fn prompt_preview(prompt: &str) -> String {
    prompt.chars().take(PROMPT_PREVIEW_CHARS).collect()
}
