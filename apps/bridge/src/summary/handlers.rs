//! Axum route handlers for the summary API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::state::AppState;
use crate::summary::models::{
    BridgeResponse, Endpoint, HSE_SUMMARY, INCIDENT_SUMMARY, ITEM_SUMMARY,
};
use crate::summary::pipeline::run_pipeline;

async fn handle(
    endpoint: &Endpoint,
    state: AppState,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BridgeResponse>, AppError> {
    // Bodies that are not JSON get the same `{error}` contract as a missing field.
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let response =
        run_pipeline(endpoint, &payload, state.records.as_ref(), state.llm.as_ref()).await?;
    Ok(Json(response))
}

/// POST /hse-summary
///
/// One-line incident summary built locally from the record.
pub async fn handle_hse_summary(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BridgeResponse>, AppError> {
    handle(&HSE_SUMMARY, state, payload).await
}

/// POST /hse-summary-item
///
/// Free-text model summary of a request item.
pub async fn handle_item_summary(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BridgeResponse>, AppError> {
    handle(&ITEM_SUMMARY, state, payload).await
}

/// POST /hse-summary-incident
///
/// Structured model summary of an incident: narrative with risk level, plus follow-up actions.
pub async fn handle_incident_summary(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BridgeResponse>, AppError> {
    handle(&INCIDENT_SUMMARY, state, payload).await
}
