//! Model catalog endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::ModelsResponse;
use crate::ServerState;

/// Lists the candidate models offered to users and the judge model.
pub async fn list(State(state): State<Arc<ServerState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.settings.catalog.list().to_vec(),
        judge_model: state.evaluator.judge_model().to_string(),
    })
}
