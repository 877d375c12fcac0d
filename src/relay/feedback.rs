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
use crate::core::models::FeedbackRequest;

/// `POST /api/feedback`
///
/// Fields are forwarded verbatim. The rating is not range-checked here.
pub(crate) async fn submit_feedback(
    State(state): State<Arc<RelayState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let Json(payload) = payload?;
    let feedback: FeedbackRequest = parse_payload(&payload, "feedback")?;

    log::info!(
        "Relaying feedback rating {} (session {})",
        feedback.rating,
        feedback.session_id.as_deref().unwrap_or("-")
    );

    let ack = state
        .backend
        .forward("Feedback", Method::POST, &["api", "feedback"], ForwardBody::Json(payload))
        .await?;
    Ok(Json(ack))
}
