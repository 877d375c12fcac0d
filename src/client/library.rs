//! Document library and upload widget state.

use std::path::Path;

use thiserror::Error;

use super::api::ApiError;
use crate::core::models::{Document, UploadReceipt};

pub const PDF_MIME: &str = "application/pdf";

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    /// Declared MIME type, if the picker supplied one.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data,
        }
    }

    /// Read a file from disk. The MIME type is declared only for `.pdf` names.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let data = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        let content_type = has_pdf_extension(&filename).then(|| PDF_MIME.to_string());
        Ok(Self::new(filename, content_type, data))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("Only PDF files can be uploaded ({filename} is {content_type})")]
    NotPdfType { filename: String, content_type: String },

    #[error("Only PDF files can be uploaded ({0} does not end in .pdf)")]
    NotPdfName(String),

    #[error("An upload is already in progress")]
    Busy,
}

fn has_pdf_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// PDF-only gate, applied before any network call.
pub fn validate_upload(file: &UploadFile) -> Result<(), UploadRejection> {
    if let Some(content_type) = file.content_type.as_deref().filter(|ct| !ct.is_empty()) {
        if !content_type.eq_ignore_ascii_case(PDF_MIME) {
            return Err(UploadRejection::NotPdfType {
                filename: file.filename.clone(),
                content_type: content_type.to_string(),
            });
        }
    }
    if !has_pdf_extension(&file.filename) {
        return Err(UploadRejection::NotPdfName(file.filename.clone()));
    }
    Ok(())
}

/// Client-side view of the backend's documents.
///
/// Each operation follows the same begin/complete split as the chat. A failed
/// operation never touches the list.
#[derive(Debug, Default)]
pub struct Library {
    documents: Vec<Document>,
    refreshing: bool,
    deleting: Option<String>,
    uploading: Option<String>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn deleting(&self) -> Option<&str> {
        self.deleting.as_deref()
    }

    pub fn uploading(&self) -> Option<&str> {
        self.uploading.as_deref()
    }

    pub fn total_chunks(&self) -> u64 {
        self.documents.iter().map(|d| d.chunks_count).sum()
    }

    /// Returns false if a refresh is already running.
    pub fn begin_refresh(&mut self) -> bool {
        if self.refreshing {
            return false;
        }
        self.refreshing = true;
        true
    }

    pub fn complete_refresh(&mut self, result: Result<Vec<Document>, ApiError>) -> Result<(), ApiError> {
        self.refreshing = false;
        let documents = result?;
        log::debug!("Library refreshed: {} documents", documents.len());
        self.documents = documents;
        Ok(())
    }

    /// Returns false if another delete is in flight.
    pub fn begin_delete(&mut self, id: &str) -> bool {
        if self.deleting.is_some() {
            return false;
        }
        self.deleting = Some(id.to_string());
        true
    }

    /// The list is left as is either way; a successful delete is followed by
    /// a refresh from the owner.
    pub fn complete_delete(&mut self, result: Result<(), ApiError>) -> Result<(), ApiError> {
        self.deleting = None;
        result
    }

    pub fn begin_upload(&mut self, file: &UploadFile) -> Result<(), UploadRejection> {
        if self.uploading.is_some() {
            return Err(UploadRejection::Busy);
        }
        validate_upload(file)?;
        self.uploading = Some(file.filename.clone());
        Ok(())
    }

    /// Returns the uploaded filename alongside the backend receipt.
    pub fn complete_upload(
        &mut self,
        result: Result<UploadReceipt, ApiError>,
    ) -> Result<(String, UploadReceipt), ApiError> {
        let filename = self.uploading.take().unwrap_or_default();
        result.map(|receipt| (filename, receipt))
    }
}
