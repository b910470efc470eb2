//! Data transfer objects for HTTP message serialization.

use ezeval_config::CatalogModel;
use serde::{Deserialize, Serialize};

/// How evaluation outcomes are ordered in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Descending score, failures last.
    Score,
}

/// Query parameters for the evaluate endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct EvaluateQuery {
    #[serde(default)]
    pub sort: Option<SortOrder>,
}

/// Response listing the candidate models and the judge.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsResponse {
    pub models: Vec<CatalogModel>,
    pub judge_model: String,
}
