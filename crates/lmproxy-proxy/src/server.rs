//! Axum HTTP server for the OpenAI-compatible proxy.
//!
//! This module provides the router and the `serve()` function that runs
//! the proxy using a pre-bound TcpListener (from the supervisor).

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use chrono::Utc;
use lmproxy_core::{LanguageModelHost, ModelRequest, RequestOptions};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::{debug, error, info};

use crate::docs;
use crate::encode::encode_response;
use crate::error::ProxyError;
use crate::invoke::{invoke_model, select_model};
use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ModelsResponse};
use crate::translate::{translate_messages, translate_tools};
use crate::validation::validate_request;

/// Shared application state for the proxy server.
#[derive(Clone)]
struct ProxyState {
    /// Host model capability every request is forwarded to.
    host: Arc<dyn LanguageModelHost>,
    /// Server-wide token; each request invocation runs on a child of it.
    shutdown: CancellationToken,
}

/// Build the proxy router.
///
/// `docs_assets_dir`, when set, is served under `/api-docs/static` and the
/// documentation page loads Swagger UI from there instead of a CDN.
pub fn router(
    host: Arc<dyn LanguageModelHost>,
    shutdown: CancellationToken,
    docs_assets_dir: Option<PathBuf>,
) -> Router {
    let state = ProxyState { host, shutdown };
    let local_assets = docs_assets_dir.is_some();

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/v1/chat/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .route(
            docs::DOCS_PATH,
            get(move || async move { docs::docs_html(local_assets) }),
        )
        .route(docs::OPENAPI_PATH, get(docs::openapi_json));

    if let Some(dir) = docs_assets_dir {
        app = app.nest_service(docs::STATIC_PREFIX, ServeDir::new(dir));
    }

    app.with_state(state)
}

/// Run the proxy server with a pre-bound listener.
///
/// Runs until `cancel` is triggered. Cancelling also cancels every
/// in-flight host invocation.
pub async fn serve(
    listener: TcpListener,
    host: Arc<dyn LanguageModelHost>,
    docs_assets_dir: Option<PathBuf>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Proxy server starting on {addr}");

    let app = router(host, cancel.clone(), docs_assets_dir);

    info!("Proxy listening on {addr}");
    info!("OpenAI clients can use: http://{addr}/v1");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Proxy server shut down");
    Ok(())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

/// List the host's chat models.
async fn list_models(State(state): State<ProxyState>) -> Response {
    debug!("GET /v1/chat/models");

    match state.host.select_chat_models().await {
        Ok(models) => Json(ModelsResponse {
            models: models.iter().map(|m| m.descriptor().clone()).collect(),
        })
        .into_response(),
        Err(e) => {
            error!("Failed to list models: {e}");
            ProxyError::ModelListing(e).into_response()
        }
    }
}

/// Handle chat completions - validate, translate, invoke and encode.
async fn chat_completions(State(state): State<ProxyState>, body: Bytes) -> Response {
    debug!("POST /v1/chat/completions");

    match complete(&state, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!(status = %e.status(), "Chat completion failed: {e}");
            e.into_response()
        }
    }
}

async fn complete(state: &ProxyState, body: &[u8]) -> Result<ChatCompletionResponse, ProxyError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ProxyError::invalid_body("body", format!("is not valid JSON: {e}")))?;

    validate_request(&value).map_err(ProxyError::InvalidBody)?;

    let request: ChatCompletionRequest = serde_json::from_value(value)
        .map_err(|e| ProxyError::invalid_body("body", e.to_string()))?;

    if request.stream {
        return Err(ProxyError::StreamingUnsupported);
    }

    let models = state
        .host
        .select_chat_models()
        .await
        .map_err(ProxyError::ModelListing)?;
    let model = select_model(&models, request.model.as_deref())?;

    info!(
        requested = request.model.as_deref().unwrap_or_default(),
        model = %model.descriptor().id,
        messages = request.messages.len(),
        tools = request.tools.len(),
        "Processing chat completion request"
    );

    let model_request = ModelRequest {
        messages: translate_messages(&request.messages),
        tools: translate_tools(&request.tools),
        options: RequestOptions {
            temperature: request.temperature,
            stream: request.stream,
        },
    };

    // Dropping this handler (client went away) cancels the invocation.
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let collected = invoke_model(model.as_ref(), model_request, cancel).await?;

    Ok(encode_response(
        request.model.as_deref().unwrap_or_default(),
        collected,
        Utc::now(),
    ))
}
