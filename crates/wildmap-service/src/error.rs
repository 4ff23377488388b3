//! Wire-format error responses.
//!
//! Every endpoint reports failures as `{error: string, details?: any}` with
//! status 400 (bad input), 500 (internal/config), or 502 (upstream failure).
//! Handlers convert all library errors at their boundary; nothing propagates
//! uncaught to the transport layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use wildmap_lib::Error as LibError;

/// JSON error body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,

    /// Short human-readable error message.
    pub error: String,

    /// Raw upstream payload, when one is worth surfacing for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// 400 Bad Request for missing or empty required input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: message.into(),
            details: None,
        }
    }

    /// 500 Internal Server Error for a missing server-held credential.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: message.into(),
            details: None,
        }
    }

    /// 502 Bad Gateway for an upstream non-success surfaced to the caller.
    pub fn upstream(message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            error: message.into(),
            details,
        }
    }

    /// 500 Internal Server Error with a generic message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: message.into(),
            details: None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.error)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(&self)).into_response()
    }
}

/// Convert a library error into the wire shape.
///
/// Credential errors become 500; upstream status errors become 502 carrying
/// the raw payload; everything else (network, decode, schema) gets the
/// handler's fallback message and status.
pub fn from_lib_error(error: &LibError, fallback: &str, fallback_status: StatusCode) -> ApiError {
    match error {
        LibError::MissingCredential { .. } => ApiError::configuration(error.to_string()),
        LibError::UpstreamStatus {
            service, payload, ..
        } => ApiError::upstream(format!("{} error", service), Some(payload.clone())),
        LibError::SchemaMismatch { .. } => ApiError::upstream(error.to_string(), None),
        _ => ApiError {
            status: fallback_status,
            error: fallback.to_string(),
            details: None,
        },
    }
}
