//! HTTP server entry point and Axum router setup.
//!
//! Reads settings from the environment, builds the provider client and the
//! evaluator once, and serves the evaluation API.

mod dto;
mod error;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use ezeval_config::Settings;
use ezeval_engine::Evaluator;
use ezeval_llm::LlmClient;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub settings: Settings,
    pub evaluator: Evaluator,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let state = Arc::new(init_server_state()?);
    let addr = state.settings.bind_addr.clone();

    let app = router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the router with tracing and CORS layers.
pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/api/evaluate", post(handlers::evaluate::evaluate))
        .route("/api/models", get(handlers::models::list))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

/// Reads settings and wires the provider client into the evaluator.
fn init_server_state() -> Result<ServerState> {
    let settings = Settings::from_env()?;
    info!("Provider: {}", settings.api_base);
    info!("Judge model: {}", settings.judge_model);
    info!("Failure policy: {:?}", settings.failure_policy);
    info!("Loaded {} catalog models", settings.catalog.list().len());
    for m in settings.catalog.list() {
        info!("  - {} ({})", m.name, m.id);
    }

    let client = LlmClient::new(&settings.api_base, &settings.api_key, settings.request_timeout)?;
    let evaluator = Evaluator::new(Arc::new(client), settings.judge_model.clone());

    Ok(ServerState { settings, evaluator })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use async_trait::async_trait;
    use ezeval_config::{FailurePolicy, Settings};
    use ezeval_core::{EvalError, Message, MessageRole};
    use ezeval_engine::Evaluator;
    use ezeval_llm::{ChatCompletion, ChatProvider};

    use crate::ServerState;

    /// Canned provider: `modelA` and `modelB` answer, `broken` fails, and the
    /// judge scores by which reply it was shown.
    pub struct StubProvider;

    #[async_trait]
    impl ChatProvider for StubProvider {
        async fn complete(&self, model: &str, messages: &[Message]) -> Result<ChatCompletion, EvalError> {
            let reply = |content: &str, time: Option<f64>| ChatCompletion {
                content: Some(content.to_string()),
                completion_time_ms: time,
                ..Default::default()
            };

            match model {
                "modelA" => Ok(reply("Hi.", Some(120.0))),
                "modelB" => Ok(reply("Hello there.", None)),
                "broken" => Err(EvalError::Transport("broken: connection refused".into())),
                _ => {
                    let prompt = messages
                        .iter()
                        .find(|m| m.role == MessageRole::User)
                        .map(|m| m.content.as_str())
                        .unwrap_or_default();
                    if prompt.contains("The response is: Hi.\n") {
                        Ok(reply(r#"{"score": 90, "reasoning": "Concise and correct."}"#, None))
                    } else {
                        Ok(reply(r#"{"score": 60, "reasoning": "Wordier than asked."}"#, None))
                    }
                }
            }
        }
    }

    pub fn state_with(provider: impl ChatProvider + 'static, policy: FailurePolicy) -> Arc<ServerState> {
        let mut settings = Settings::from_lookup(|key| match key {
            "GROQ_API_KEY" => Some("test-key".to_string()),
            _ => None,
        })
        .unwrap();
        settings.failure_policy = policy;

        let evaluator = Evaluator::new(Arc::new(provider), settings.judge_model.clone());
        Arc::new(ServerState { settings, evaluator })
    }
}
