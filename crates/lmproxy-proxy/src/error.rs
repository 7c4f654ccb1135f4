//! Proxy error type and its HTTP mapping.
//!
//! Every failure of the completion pipeline ends up here and is converted
//! into one of three bodies:
//! - 400 `{"error": "Invalid request body", "details": [...]}` for
//!   structural problems;
//! - 400 `{"error": {"type": "invalid_request", ...}}` for requests the
//!   proxy understands but cannot serve;
//! - 500 `{"error": {"type": "internal_server_error", ...}}` for host failures.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lmproxy_core::HostError;
use thiserror::Error;

use crate::models::{ErrorResponse, InvalidBodyResponse};
use crate::validation::Violation;

/// Errors produced while serving a proxy request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The body is not a structurally valid chat-completion request.
    #[error("Invalid request body")]
    InvalidBody(Vec<Violation>),

    /// `stream: true` was requested.
    #[error("Streaming responses are not supported; set \"stream\" to false")]
    StreamingUnsupported,

    /// The requested model id is not offered by the host.
    #[error("Model {0} not found")]
    ModelNotFound(String),

    /// The host offers no models at all.
    #[error("No chat models available")]
    NoModelsAvailable,

    /// The host failed to list its models.
    #[error("Failed to list models: {0}")]
    ModelListing(HostError),

    /// The host failed while answering.
    #[error("{0}")]
    Invocation(HostError),
}

impl ProxyError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::StreamingUnsupported | Self::ModelNotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NoModelsAvailable | Self::ModelListing(_) | Self::Invocation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Shorthand for a single-violation body error.
    pub fn invalid_body(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBody(vec![Violation::new(path, message)])
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::InvalidBody(details) => {
                (status, Json(InvalidBodyResponse::new(details))).into_response()
            }
            other if status == StatusCode::BAD_REQUEST => (
                status,
                Json(ErrorResponse::invalid_request(other.to_string())),
            )
                .into_response(),
            other => (status, Json(ErrorResponse::internal(other.to_string()))).into_response(),
        }
    }
}
