//! API endpoint handlers
//!
//! This module implements the HTTP endpoints of the proxy: the `/ask`
//! completion relay, a health check and a service description.

use crate::api::error::{AskError, error_body};
use crate::core::config::Config;
use crate::core::constants::{error_type, route};
use crate::core::provider::Provider;
use crate::models::ask::{AskRequest, AskResponse};
use crate::models::openai::ChatCompletionRequest;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn Provider>,
}

/// Create the API router with all endpoints
///
/// Request bodies are unbounded unless `[server] max_body_bytes` is set.
pub fn create_router(state: AppState) -> Router {
    let body_limit = match state.config.max_body_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route(route::ROOT, get(root))
        .route(route::ASK, post(ask))
        .route(route::HEALTH, get(health_check))
        .fallback(not_found)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /ask - Relay a query to the completion service
///
/// Decoding failures are turned into [`AskError::MalformedRequest`] (or
/// [`AskError::UnreadableBody`] when the body cannot be buffered) before any
/// outbound call is made.
async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AskError> {
    let request_id = uuid::Uuid::new_v4().to_string();

    let Json(payload) = payload.map_err(|rejection| {
        warn!(%request_id, "Rejected ask request body: {}", rejection.body_text());
        AskError::from(rejection)
    })?;

    info!(
        %request_id,
        model = %state.config.model,
        query_len = payload.query.len(),
        "📥 Incoming ask request"
    );

    let completion_request = ChatCompletionRequest::single_turn(&state.config.model, payload.query);

    let completion = state
        .provider
        .create_chat_completion(&completion_request)
        .await
        .map_err(|e| {
            error!(%request_id, "Provider API error: {}", e);
            AskError::from(e)
        })?;

    let Some(content) = completion.first_content() else {
        error!(
            %request_id,
            choices = completion.choices.len(),
            "Provider returned no completion content"
        );
        return Err(AskError::EmptyCompletion);
    };

    debug!(
        %request_id,
        response_len = content.len(),
        total_tokens = completion.usage.as_ref().map(|usage| usage.total_tokens),
        "Ask request completed"
    );

    Ok(Json(AskResponse {
        response: content.to_string(),
    }))
}

/// GET / - Root endpoint
async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": concat!("Ask Proxy v", env!("CARGO_PKG_VERSION")),
        "status": "running",
        "provider": state.provider.provider_name(),
        "model": state.config.model,
        "endpoints": {
            "ask": route::ASK,
            "health": route::HEALTH,
        },
    }))
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "provider": state.provider.provider_name(),
        "model": state.config.model,
    }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        error_body(error_type::NOT_FOUND, "Route not found"),
    )
}
