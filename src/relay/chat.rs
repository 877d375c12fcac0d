use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use reqwest::Method;
use serde_json::Value;

use super::backend::ForwardBody;
use super::error::RelayError;
use super::{parse_payload, RelayState};
use crate::core::models::{ChatRequest, ChatResponse};

/// `POST /api/chat`
///
/// The payload is validated as a [`ChatRequest`] but forwarded exactly as
/// received. The backend reply is shape-checked and returned verbatim.
pub(crate) async fn chat(
    State(state): State<Arc<RelayState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let Json(payload) = payload?;

    let request: ChatRequest = parse_payload(&payload, "chat request")?;
    if request.is_blank() {
        return Err(RelayError::bad_request("Question is required"));
    }

    log::info!(
        "Relaying chat question ({} chars, session {})",
        request.question.chars().count(),
        request.session_id.as_deref().unwrap_or("-")
    );

    let answer = state
        .backend
        .forward_checked::<ChatResponse>("Chat", Method::POST, &["api", "chat"], ForwardBody::Json(payload))
        .await?;

    Ok(Json(answer))
}
