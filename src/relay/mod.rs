//! Relay Service
//!
//! Thin HTTP endpoints that forward client requests to the RAG backend and
//! translate its replies and failures into a uniform JSON contract.
//!
//! ## Endpoints
//! - `POST /api/chat` - Ask a question about the uploaded documents
//! - `POST /api/upload` - Multipart upload, field `file`
//! - `GET /api/documents` - List processed documents
//! - `DELETE /api/documents/{id}` - Remove a document
//! - `POST /api/feedback` - Rate an answer
//! - `POST /api/generate-chart` - Chart generation via the backend analysis router
//! - `GET /api/health` - Health check (does not contact the backend)
//!
//! ## Errors
//! Every non-200 response is `{ "error": "..." }`. See [`RelayError`].

mod analysis;
pub mod backend;
mod chat;
mod documents;
pub mod error;
mod feedback;
mod upload;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::core::models::HealthResponse;

pub use backend::{BackendClient, ForwardBody};
pub use error::RelayError;

use crate::VERSION;

/// Shared, immutable per-process state.
#[derive(Debug)]
pub struct RelayState {
    pub backend: BackendClient,
    /// Upload body limit, also named in the 413 message.
    pub max_upload_bytes: usize,
}

/// Validate a JSON payload against `T` without consuming it.
pub(crate) fn parse_payload<T: DeserializeOwned>(payload: &Value, what: &str) -> Result<T, RelayError> {
    if !payload.is_object() {
        return Err(RelayError::bad_request("Request body must be a JSON object"));
    }
    T::deserialize(payload).map_err(|e| RelayError::bad_request(format!("Invalid {what}: {e}")))
}

// ============================================================================
// Router
// ============================================================================

/// Build the relay router. `state.max_upload_bytes` bounds the upload body only.
pub fn router(state: Arc<RelayState>) -> Router {
    let max_upload_bytes = state.max_upload_bytes;
    Router::new()
        .route("/api/health", get(health_check).fallback(get_only))
        .route("/api/chat", post(chat::chat).fallback(post_only))
        .route(
            "/api/upload",
            post(upload::upload)
                .fallback(post_only)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/documents", get(documents::list_documents).fallback(get_only))
        .route(
            "/api/documents/:id",
            delete(documents::delete_document).fallback(delete_only),
        )
        .route("/api/feedback", post(feedback::submit_feedback).fallback(post_only))
        .route("/api/generate-chart", post(analysis::generate_chart).fallback(post_only))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
    })
}

async fn get_only() -> RelayError {
    RelayError::method_not_allowed("GET")
}

async fn post_only() -> RelayError {
    RelayError::method_not_allowed("POST")
}

async fn delete_only() -> RelayError {
    RelayError::method_not_allowed("DELETE")
}

async fn not_found(uri: Uri) -> RelayError {
    RelayError::NotFound(uri.path().to_string())
}

// ============================================================================
// Relay Service
// ============================================================================

/// Owns the listening socket and the shutdown handle of a running relay.
pub struct RelayService {
    host: String,
    port: u16,
    state: Arc<RelayState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: Option<SocketAddr>,
}

impl RelayService {
    pub fn new(host: impl Into<String>, port: u16, backend: BackendClient, max_upload_bytes: usize) -> Self {
        Self {
            host: host.into(),
            port,
            state: Arc::new(RelayState {
                backend,
                max_upload_bytes,
            }),
            shutdown_tx: None,
            local_addr: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, RelayError> {
        let backend = BackendClient::new(
            &config.relay.backend_url(),
            Duration::from_secs(config.relay.timeout_secs),
        )?;
        Ok(Self::new(
            config.server.host.clone(),
            config.server.port,
            backend,
            config.relay.max_upload_bytes,
        ))
    }

    /// Bound address once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Base URL of the running relay.
    pub fn url(&self) -> Option<String> {
        self.local_addr.map(|addr| format!("http://{}", addr))
    }

    /// Bind and start serving in a background task.
    ///
    /// Binding happens before this returns, so port conflicts surface as an
    /// error here rather than in the log.
    pub async fn start(&mut self) -> Result<SocketAddr, RelayError> {
        if self.shutdown_tx.is_some() {
            return Err(RelayError::AlreadyRunning);
        }

        let bind_err = |source| RelayError::Bind {
            addr: format!("{}:{}", self.host, self.port),
            source,
        };
        let listener = tokio::net::TcpListener::bind((self.host.as_str(), self.port))
            .await
            .map_err(bind_err)?;
        let addr = listener.local_addr().map_err(bind_err)?;

        let app = router(self.state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        log::info!(
            "Relay listening on http://{} (backend {})",
            addr,
            self.state.backend.base_url()
        );

        tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    log::info!("Relay shutting down");
                })
                .await;
            if let Err(e) = result {
                log::error!("Relay server error: {}", e);
            }
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(addr);
        Ok(addr)
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            self.local_addr = None;
            log::info!("Relay stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let backend = BackendClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        router(Arc::new(RelayState {
            backend,
            max_upload_bytes: 1024,
        }))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_router()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = test_router()
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_wrong_method_on_chat() {
        let response = test_router()
            .oneshot(Request::get("/api/chat").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "POST");
    }

    #[tokio::test]
    async fn test_non_object_payload_rejected() {
        let response = test_router()
            .oneshot(
                Request::post("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from("[1,2,3]"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let response = test_router()
            .oneshot(
                Request::post("/api/feedback")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_413() {
        let mut body = String::from(
            "--XBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"big.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n",
        );
        body.push_str(&"x".repeat(4096));
        body.push_str("\r\n--XBOUNDARY--\r\n");

        let response = test_router()
            .oneshot(
                Request::post("/api/upload")
                    .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await["error"],
            "File is too large (limit 1024 bytes)"
        );
    }

    #[tokio::test]
    async fn test_service_start_stop() {
        let backend = BackendClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let mut service = RelayService::new("127.0.0.1", 0, backend, 1024);
        let addr = service.start().await.unwrap();
        assert_ne!(addr.port(), 0);
        assert!(service.is_running());
        assert!(matches!(service.start().await, Err(RelayError::AlreadyRunning)));

        service.stop().await;
        assert!(!service.is_running());
        assert!(service.url().is_none());
    }
}
