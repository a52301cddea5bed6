//! Handler error type and its HTTP rendering

use crate::core::constants::error_type;
use crate::core::provider::ProviderError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failure exits of the `/ask` handler
#[derive(Debug, Error)]
pub enum AskError {
    /// Body is not JSON or lacks a text `query`
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Body could not be buffered (size limit, broken stream)
    #[error("Unreadable request body: {message}")]
    UnreadableBody { status: StatusCode, message: String },

    /// Completion call failed
    #[error(transparent)]
    Upstream(#[from] ProviderError),

    /// Completion call succeeded but carried no usable choice
    #[error("Upstream returned no completion content")]
    EmptyCompletion,
}

impl AskError {
    pub fn status(&self) -> StatusCode {
        match self {
            AskError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AskError::UnreadableBody { status, .. } => *status,
            AskError::Upstream(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AskError::Upstream(_) | AskError::EmptyCompletion => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            AskError::MalformedRequest(_) => error_type::INVALID_REQUEST,
            AskError::UnreadableBody { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                error_type::REQUEST_TOO_LARGE
            }
            AskError::UnreadableBody { .. } => error_type::INVALID_REQUEST,
            AskError::Upstream(e) if e.is_timeout() => error_type::TIMEOUT,
            AskError::Upstream(_) | AskError::EmptyCompletion => error_type::API,
        }
    }
}

impl From<JsonRejection> for AskError {
    fn from(rejection: JsonRejection) -> Self {
        match &rejection {
            JsonRejection::BytesRejection(_) => AskError::UnreadableBody {
                status: rejection.status(),
                message: rejection.body_text(),
            },
            _ => AskError::MalformedRequest(rejection.body_text()),
        }
    }
}

/// JSON error body shared by every failing route
pub fn error_body(kind: &str, message: impl Into<String>) -> Json<serde_json::Value> {
    Json(json!({
        "type": "error",
        "error": {
            "type": kind,
            "message": message.into()
        }
    }))
}

impl IntoResponse for AskError {
    fn into_response(self) -> Response {
        (self.status(), error_body(self.error_type(), self.to_string())).into_response()
    }
}
