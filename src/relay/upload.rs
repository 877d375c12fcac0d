use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use reqwest::{
    multipart::{Form, Part},
    Method,
};
use serde_json::Value;

use super::backend::ForwardBody;
use super::error::RelayError;
use super::RelayState;

pub const FILE_FIELD: &str = "file";
pub const DEFAULT_FILENAME: &str = "untitled";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file pulled out of an incoming multipart body.
#[derive(Debug, Clone)]
pub(crate) struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    fn into_form(self) -> Result<Form, RelayError> {
        let part = Part::bytes(self.data.to_vec())
            .file_name(self.filename)
            .mime_str(&self.content_type)
            .map_err(|e| RelayError::bad_request(format!("Invalid content type: {e}")))?;
        Ok(Form::new().part(FILE_FIELD, part))
    }
}

/// Decode the whole multipart body and keep the first `file` field.
async fn extract_file(mut multipart: Multipart, limit: usize) -> Result<Option<UploadedFile>, RelayError> {
    let read_err = |e| RelayError::from_multipart(e, limit);
    while let Some(field) = multipart.next_field().await.map_err(read_err)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_FILENAME)
            .to_string();
        let content_type = field
            .content_type()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = field.bytes().await.map_err(read_err)?;

        return Ok(Some(UploadedFile {
            filename,
            content_type,
            data,
        }));
    }
    Ok(None)
}

/// `POST /api/upload`
///
/// Rebuilds the multipart body with the original filename and content type
/// instead of streaming the client's bytes through.
pub(crate) async fn upload(
    State(state): State<Arc<RelayState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, RelayError> {
    let file = extract_file(multipart?, state.max_upload_bytes)
        .await?
        .ok_or_else(|| RelayError::bad_request("No file provided"))?;

    log::info!(
        "Relaying upload '{}' ({}, {} bytes)",
        file.filename,
        file.content_type,
        file.data.len()
    );

    let form = file.into_form()?;
    let receipt = state
        .backend
        .forward("Upload", Method::POST, &["api", "upload"], ForwardBody::Multipart(form))
        .await?;

    Ok(Json(receipt))
}
