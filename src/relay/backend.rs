//! Outbound client for the RAG backend.
//!
//! Every relay handler goes through [`BackendClient::forward`], which issues
//! the request, decodes the JSON reply, and folds every failure mode into a
//! [`RelayError`] carrying the operation name.

use std::time::Duration;

use reqwest::{multipart::Form, Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::error::{backend_message, RelayError};
use crate::core::http::{endpoint, parse_base_url};

/// Body of a forwarded request.
pub enum ForwardBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RelayError> {
        let invalid = |reason: String| RelayError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let parsed = parse_base_url(base_url).map_err(invalid)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve path segments against the base URL. Segments are percent-encoded,
    /// so a document id can never escape its path position.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        endpoint(&self.base_url, segments)
    }

    /// Send one request to the backend and return its JSON body.
    ///
    /// A 2xx reply with an empty body (e.g. 204) yields `Value::Null`.
    pub async fn forward(
        &self,
        operation: &'static str,
        method: Method,
        segments: &[&str],
        body: ForwardBody,
    ) -> Result<Value, RelayError> {
        let url = self.endpoint(segments);
        log::debug!("{} -> {} {}", operation, method, url);

        let mut request = self.http.request(method, url);
        request = match body {
            ForwardBody::Empty => request,
            ForwardBody::Json(value) => request.json(&value),
            ForwardBody::Multipart(form) => request.multipart(form),
        };

        let response = request
            .send()
            .await
            .map_err(|source| RelayError::Transport { operation, source })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| RelayError::Transport { operation, source })?;

        if !status.is_success() {
            let message = backend_message(status.as_u16(), &bytes);
            log::warn!("{} rejected by backend: {} - {}", operation, status.as_u16(), message);
            return Err(RelayError::Backend {
                operation,
                status: status.as_u16(),
                message,
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| RelayError::InvalidResponse {
            operation,
            reason: e.to_string(),
        })
    }

    /// Like [`forward`](Self::forward), but also checks the reply against `T`.
    /// The original JSON is returned untouched so unknown fields survive.
    pub async fn forward_checked<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        segments: &[&str],
        body: ForwardBody,
    ) -> Result<Value, RelayError> {
        let value = self.forward(operation, method, segments, body).await?;
        T::deserialize(&value).map_err(|e| RelayError::InvalidResponse {
            operation,
            reason: e.to_string(),
        })?;
        Ok(value)
    }
}
