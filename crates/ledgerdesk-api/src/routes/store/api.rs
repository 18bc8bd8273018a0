//! Store API endpoints - read, replace or clear the persisted JSON blob

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::error::ErrorStyle;
use crate::routes::proxy::{json_body, ApiResult};
use crate::AppState;

const STYLE: ErrorStyle = ErrorStyle::Plain;

/// The stored blob, or `null` when nothing is stored
pub async fn api_store_get(State(state): State<AppState>) -> Response {
    Json(state.store.load().await.unwrap_or(Value::Null)).into_response()
}

pub async fn api_store_put(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let value: Value = json_body(STYLE, &body)?;
    state.store.save(&value).await;
    log::debug!(target: "ledgerdesk::store", "Saved state to {}", state.store.path().display());
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn api_store_delete(State(state): State<AppState>) -> Response {
    state.store.delete().await;
    StatusCode::NO_CONTENT.into_response()
}
