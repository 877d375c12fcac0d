use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use reqwest::Method;
use serde_json::Value;

use super::backend::ForwardBody;
use super::error::RelayError;
use super::RelayState;
use crate::core::models::{DeleteResponse, DocumentList};

/// `GET /api/documents`
pub(crate) async fn list_documents(
    State(state): State<Arc<RelayState>>,
) -> Result<Json<Value>, RelayError> {
    let documents = state
        .backend
        .forward_checked::<DocumentList>("List documents", Method::GET, &["api", "documents"], ForwardBody::Empty)
        .await?;
    Ok(Json(documents))
}

/// `DELETE /api/documents/{id}`
///
/// Any 2xx from the backend, with or without a body, becomes `{success: true}`.
pub(crate) async fn delete_document(
    State(state): State<Arc<RelayState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, RelayError> {
    if id.trim().is_empty() {
        return Err(RelayError::bad_request("Document id is required"));
    }

    log::info!("Relaying delete for document {}", id);
    state
        .backend
        .forward("Delete document", Method::DELETE, &["api", "documents", &id], ForwardBody::Empty)
        .await?;

    Ok(Json(DeleteResponse { success: true }))
}
