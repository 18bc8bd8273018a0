//! Shared plumbing for the `/api/*` proxy handlers
//!
//! Every handler turns one local request into exactly one upstream call
//! through `forward`, then shapes the reply with `relay` or `envelope`.

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ErrorStyle};
use crate::AppState;

pub type ApiResult = Result<Response, ApiError>;

/// Percent-encode an id for use as one upstream path segment
pub fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// The router's `Method` as the one the upstream client sends with
pub fn upstream_method(
    style: ErrorStyle,
    method: &Method,
) -> Result<ledgerdesk_client::Method, ApiError> {
    ledgerdesk_client::Method::from_bytes(method.as_str().as_bytes()).map_err(|e| {
        ApiError::Internal {
            style,
            message: format!("Unsupported method {}: {}", method, e),
        }
    })
}

/// Call upstream once and return the body of a 2xx reply
pub async fn forward(
    state: &AppState,
    method: Method,
    path: &str,
    body: Option<&Value>,
    style: ErrorStyle,
    default_message: &str,
) -> Result<Value, ApiError> {
    log::debug!(target: "ledgerdesk::proxy", "{} {}", method, path);
    let method = upstream_method(style, &method)?;
    state
        .upstream
        .send(method, path, body)
        .await
        .and_then(|reply| reply.into_result(default_message))
        .map_err(|e| ApiError::from_client(style, e, default_message))
}

/// Forward and answer with `success` and the upstream body as-is
pub async fn relay(
    state: &AppState,
    method: Method,
    path: &str,
    body: Option<&Value>,
    success: StatusCode,
    style: ErrorStyle,
    default_message: &str,
) -> ApiResult {
    let reply = forward(state, method, path, body, style, default_message).await?;
    if success == StatusCode::NO_CONTENT {
        return Ok(success.into_response());
    }
    Ok((success, Json(reply)).into_response())
}

/// `{"success": true, "data": ...}`
pub fn envelope(data: Value) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

/// Request body as JSON; an empty body is an error
pub fn json_body<T: DeserializeOwned>(style: ErrorStyle, bytes: &Bytes) -> Result<T, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::bad_request(style, "Request body is required"));
    }
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::bad_request(style, format!("Invalid JSON body: {}", e)))
}

/// Typed upstream body as a JSON value
pub fn to_body<T: Serialize>(style: ErrorStyle, body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Internal {
        style,
        message: format!("Failed to encode request: {}", e),
    })
}

/// Request body as JSON when one was sent
pub fn optional_json_body(style: ErrorStyle, bytes: &Bytes) -> Result<Option<Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    json_body(style, bytes).map(Some)
}

/// Required non-blank identifier, 400 otherwise
pub fn require<'a>(
    value: &'a Option<String>,
    style: ErrorStyle,
    message: &str,
) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(style, message)),
    }
}

/// Answer unsupported methods with 405 and an explicit `Allow` list
pub fn with_allow(router: MethodRouter<AppState>, allow: &'static str) -> MethodRouter<AppState> {
    router.fallback(move |method: Method| async move {
        ApiError::MethodNotAllowed {
            method: method.to_string(),
            allow,
        }
        .into_response()
    })
}
