//! Relay error taxonomy.
//!
//! Every failure leaves the relay as a JSON `{ "error": ... }` body. Input
//! problems map to 400, unknown routes to 404 and wrong methods to 405. An
//! upload over the body limit maps to 413.
//! Anything involving the backend (transport, non-2xx, unexpected shape)
//! maps to 500.

use axum::{
    extract::rejection::JsonRejection,
    extract::multipart::{MultipartError, MultipartRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::core::models::ErrorBody;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed { allow: &'static str },

    #[error("No route for {0}")]
    NotFound(String),

    #[error("File is too large (limit {limit} bytes)")]
    PayloadTooLarge { limit: usize },

    #[error("{operation} failed: {status} - {message}")]
    Backend {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} failed: unexpected backend response: {reason}")]
    InvalidResponse {
        operation: &'static str,
        reason: String,
    },

    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to bind relay to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Relay already running")]
    AlreadyRunning,
}

impl RelayError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn method_not_allowed(allow: &'static str) -> Self {
        Self::MethodNotAllowed { allow }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Relay error: {}", self);
        } else {
            log::debug!("Rejected request: {}", self);
        }

        let allow = match &self {
            Self::MethodNotAllowed { allow } => Some(*allow),
            _ => None,
        };

        let mut response = (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response();

        if let Some(allow) = allow {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for RelayError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(format!("Invalid multipart body: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for RelayError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl RelayError {
    /// Map a multipart read failure, naming `limit` when the body was cut
    /// off by the upload limit.
    pub fn from_multipart(err: MultipartError, limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge { limit }
        } else {
            err.into()
        }
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// Looks for `message`, then `detail` (FastAPI's default), then `error`. A
/// body that is not JSON, or carries none of those keys as a string, yields
/// the canonical reason phrase for `status`.
pub fn backend_message(status: u16, body: &[u8]) -> String {
    let from_body = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "detail", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .filter(|msg| !msg.trim().is_empty());

    from_body.unwrap_or_else(|| {
        StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown error")
            .to_string()
    })
}
