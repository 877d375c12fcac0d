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
use crate::core::models::ChartRequest;

/// `POST /api/generate-chart`, forwarded to the backend's analysis router.
pub(crate) async fn generate_chart(
    State(state): State<Arc<RelayState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let Json(payload) = payload?;
    let chart: ChartRequest = parse_payload(&payload, "chart request")?;

    log::info!("Relaying {:?} chart request ({} data keys)", chart.kind, chart.data.len());

    let chart = state
        .backend
        .forward(
            "Chart generation",
            Method::POST,
            &["analysis", "generate-chart"],
            ForwardBody::Json(payload),
        )
        .await?;
    Ok(Json(chart))
}
