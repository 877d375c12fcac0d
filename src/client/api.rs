//! Client side of the relay contract.
//!
//! [`AssistantApi`] is the seam between view state and the network. The
//! production implementation talks HTTP to the relay; tests substitute a mock.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::library::UploadFile;
use crate::core::http::{endpoint, parse_base_url};
use crate::core::models::{
    ChartRequest, ChatRequest, ChatResponse, DeleteResponse, Document, DocumentList, ErrorBody,
    FeedbackRequest, UploadReceipt,
};

#[derive(Error, Debug)]
pub enum ApiError {
    /// The relay answered with a non-2xx status and an `{error}` body.
    #[error("{message}")]
    Relay { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid relay URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ApiError>;

    async fn list_documents(&self) -> Result<Vec<Document>, ApiError>;

    async fn delete_document(&self, id: String) -> Result<(), ApiError>;

    async fn upload(&self, file: UploadFile) -> Result<UploadReceipt, ApiError>;

    async fn submit_feedback(&self, feedback: FeedbackRequest) -> Result<(), ApiError>;

    async fn generate_chart(&self, request: ChartRequest) -> Result<Value, ApiError>;
}

/// [`AssistantApi`] over HTTP against the relay's `/api/*` paths.
#[derive(Debug, Clone)]
pub struct HttpAssistantApi {
    http: Client,
    base_url: Url,
}

impl HttpAssistantApi {
    pub fn new(relay_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = parse_base_url(relay_url).map_err(|reason| ApiError::InvalidUrl {
            url: relay_url.to_string(),
            reason,
        })?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Url {
        endpoint(&self.base_url, segments)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.error)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            return Err(ApiError::Relay {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AssistantApi for HttpAssistantApi {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ApiError> {
        let builder = self.http.post(self.url(&["api", "chat"])).json(&request);
        self.send_json(builder).await
    }

    async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        let builder = self.http.get(self.url(&["api", "documents"]));
        let list: DocumentList = self.send_json(builder).await?;
        Ok(list.documents)
    }

    async fn delete_document(&self, id: String) -> Result<(), ApiError> {
        let builder = self.http.delete(self.url(&["api", "documents", &id]));
        let response: DeleteResponse = self.send_json(builder).await?;
        if response.success {
            Ok(())
        } else {
            Err(ApiError::Decode(format!("delete of {id} was not acknowledged")))
        }
    }

    async fn upload(&self, file: UploadFile) -> Result<UploadReceipt, ApiError> {
        let content_type = file
            .content_type
            .as_deref()
            .unwrap_or(super::library::PDF_MIME)
            .to_string();
        let part = Part::bytes(file.data)
            .file_name(file.filename)
            .mime_str(&content_type)?;
        let form = Form::new().part("file", part);

        let builder = self.http.post(self.url(&["api", "upload"])).multipart(form);
        self.send_json(builder).await
    }

    async fn submit_feedback(&self, feedback: FeedbackRequest) -> Result<(), ApiError> {
        let builder = self.http.post(self.url(&["api", "feedback"])).json(&feedback);
        let _ack: Value = self.send_json(builder).await?;
        Ok(())
    }

    async fn generate_chart(&self, request: ChartRequest) -> Result<Value, ApiError> {
        let builder = self.http.post(self.url(&["api", "generate-chart"])).json(&request);
        self.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_relay_url() {
        let err = HttpAssistantApi::new("localhost:3000", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn test_urls_follow_relay_paths() {
        let api = HttpAssistantApi::new("http://localhost:3000", Duration::from_secs(1)).unwrap();
        assert_eq!(api.url(&["api", "generate-chart"]).as_str(), "http://localhost:3000/api/generate-chart");
        assert_eq!(api.url(&["api", "documents", "doc 1"]).path(), "/api/documents/doc%201");
    }

    #[test]
    fn test_relay_error_displays_message() {
        let err = ApiError::Relay {
            status: 500,
            message: "Delete document failed: 404 - Document not found".to_string(),
        };
        assert_eq!(err.to_string(), "Delete document failed: 404 - Document not found");
    }
}
