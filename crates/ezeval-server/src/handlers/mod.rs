//! HTTP route handlers for the evaluation server.

pub mod evaluate;
pub mod models;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
