//! Top-level owner of client view state.
//!
//! `Page` holds the session id, conversation, library and toast, and is the
//! only writer of them. The `finish_*` methods apply a network result; the
//! async methods run a whole begin, call, finish sequence in place. Callers
//! that must not block (the TUI) spawn the call themselves and feed the
//! result back through `finish_*`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::api::{ApiError, AssistantApi};
use super::chat::ChatState;
use super::library::{Library, UploadFile};
use super::session::SessionId;
use super::toast::{Notifier, ToastKind};
use crate::core::models::{ChatRequest, ChatResponse, Document, FeedbackRequest, UploadReceipt};

/// What the owner should do after a library operation finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    None,
    Refresh,
}

pub struct Page {
    api: Arc<dyn AssistantApi>,
    session: SessionId,
    chat: ChatState,
    library: Library,
    toast: Notifier,
}

impl Page {
    pub fn new(api: Arc<dyn AssistantApi>, toast_duration: Duration) -> Self {
        Self::with_session(api, SessionId::new(), toast_duration)
    }

    pub fn with_session(api: Arc<dyn AssistantApi>, session: SessionId, toast_duration: Duration) -> Self {
        log::info!("Client session {}", session);
        Self {
            api,
            session,
            chat: ChatState::new(),
            library: Library::new(),
            toast: Notifier::new(toast_duration),
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Handle for spawning calls outside the owner.
    pub fn api(&self) -> Arc<dyn AssistantApi> {
        Arc::clone(&self.api)
    }

    pub fn chat(&self) -> &ChatState {
        &self.chat
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn toast(&self) -> &Notifier {
        &self.toast
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.toast.tick(now)
    }

    // ── Notifications ───────────────────────────────────────────────────

    pub fn notify(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.toast.show(kind, message);
    }

    pub fn dismiss_toast(&mut self) {
        self.toast.dismiss();
    }

    // ── Chat ────────────────────────────────────────────────────────────

    pub fn begin_send(&mut self, input: &str) -> Option<ChatRequest> {
        self.chat.begin_send(input, &self.session)
    }

    pub fn finish_send(&mut self, result: Result<ChatResponse, ApiError>) {
        if let Err(e) = self.chat.complete_send(result) {
            self.toast.error(format!("Failed to get an answer: {e}"));
        }
    }

    /// Returns false when nothing was sent (blank input or busy).
    pub async fn send(&mut self, input: &str) -> bool {
        let Some(request) = self.begin_send(input) else {
            return false;
        };
        let result = self.api.chat(request).await;
        self.finish_send(result);
        true
    }

    pub fn toggle_feedback(&mut self, index: usize) {
        self.chat.toggle_feedback(index);
    }

    pub fn begin_rating(&mut self, index: usize, rating: u8) -> Option<FeedbackRequest> {
        self.chat.rate(index, rating, &self.session)
    }

    pub fn finish_rating(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.toast.success("Thanks for your feedback!");
            }
            Err(e) => {
                self.toast.error(format!("Failed to submit feedback: {e}"));
            }
        }
    }

    pub async fn rate(&mut self, index: usize, rating: u8) -> bool {
        let Some(feedback) = self.begin_rating(index, rating) else {
            return false;
        };
        let result = self.api.submit_feedback(feedback).await;
        self.finish_rating(result);
        true
    }

    // ── Library ─────────────────────────────────────────────────────────

    pub fn finish_refresh(&mut self, result: Result<Vec<Document>, ApiError>) {
        if let Err(e) = self.library.complete_refresh(result) {
            self.toast.error(format!("Failed to load documents: {e}"));
        }
    }

    /// Returns false when a refresh is already in flight.
    pub fn begin_refresh(&mut self) -> bool {
        self.library.begin_refresh()
    }

    pub async fn refresh(&mut self) {
        if !self.begin_refresh() {
            return;
        }
        let result = self.api.list_documents().await;
        self.finish_refresh(result);
    }

    /// Returns false, with an info toast, while another delete is in flight.
    pub fn begin_delete(&mut self, id: &str) -> bool {
        if self.library.begin_delete(id) {
            return true;
        }
        self.toast.info("A delete is already in progress");
        false
    }

    pub fn finish_delete(&mut self, result: Result<(), ApiError>) -> FollowUp {
        match self.library.complete_delete(result) {
            Ok(()) => {
                self.toast.success("Document deleted");
                FollowUp::Refresh
            }
            Err(e) => {
                self.toast.error(format!("Failed to delete document: {e}"));
                FollowUp::None
            }
        }
    }

    pub async fn delete(&mut self, id: &str) {
        if !self.begin_delete(id) {
            return;
        }
        let result = self.api.delete_document(id.to_string()).await;
        if self.finish_delete(result) == FollowUp::Refresh {
            self.refresh().await;
        }
    }

    /// Gate an upload. A rejected file raises a toast and returns false.
    pub fn begin_upload(&mut self, file: &UploadFile) -> bool {
        match self.library.begin_upload(file) {
            Ok(()) => true,
            Err(rejection) => {
                self.toast.error(rejection.to_string());
                false
            }
        }
    }

    pub fn finish_upload(&mut self, result: Result<UploadReceipt, ApiError>) -> FollowUp {
        match self.library.complete_upload(result) {
            Ok((filename, receipt)) => {
                let message = match receipt.chunks_count {
                    Some(chunks) => format!("{filename} uploaded ({chunks} chunks)"),
                    None => format!("{filename} uploaded"),
                };
                self.toast.success(message);
                FollowUp::Refresh
            }
            Err(e) => {
                self.toast.error(format!("Upload failed: {e}"));
                FollowUp::None
            }
        }
    }

    pub async fn upload(&mut self, file: UploadFile) {
        if !self.begin_upload(&file) {
            return;
        }
        let result = self.api.upload(file).await;
        if self.finish_upload(result) == FollowUp::Refresh {
            self.refresh().await;
        }
    }
}
