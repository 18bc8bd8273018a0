//! Error types for ledgerdesk-api

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use ledgerdesk_client::ClientError;
use serde_json::{json, Value};
use thiserror::Error;

/// Shape of the JSON error body, fixed per route family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStyle {
    /// `{"error": msg}`
    Plain,
    /// `{"message": msg, "error": true}`
    Flagged,
    /// `{"success": false, "message": msg}`
    Envelope,
}

impl ErrorStyle {
    pub fn body(&self, message: &str) -> Value {
        match self {
            ErrorStyle::Plain => json!({ "error": message }),
            ErrorStyle::Flagged => json!({ "message": message, "error": true }),
            ErrorStyle::Envelope => json!({ "success": false, "message": message }),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { style: ErrorStyle, message: String },

    #[error("Method {method} Not Allowed")]
    MethodNotAllowed { method: String, allow: &'static str },

    #[error("{message}")]
    Upstream {
        style: ErrorStyle,
        status: u16,
        message: String,
    },

    #[error("{message}")]
    Internal { style: ErrorStyle, message: String },
}

impl ApiError {
    pub fn bad_request(style: ErrorStyle, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            style,
            message: message.into(),
        }
    }

    /// Map a client failure: upstream statuses are relayed, anything else is a 500
    /// carrying the route's generic message
    pub fn from_client(style: ErrorStyle, err: ClientError, default_message: &str) -> Self {
        match err {
            ClientError::Upstream { status, message } => ApiError::Upstream {
                style,
                status,
                message,
            },
            other => {
                log::error!(target: "ledgerdesk::proxy", "{}: {}", default_message, other);
                ApiError::Internal {
                    style,
                    message: default_message.to_string(),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::MethodNotAllowed { allow, .. } => {
                (status, [(header::ALLOW, *allow)], self.to_string()).into_response()
            }
            ApiError::BadRequest { style, message }
            | ApiError::Upstream { style, message, .. }
            | ApiError::Internal { style, message } => {
                log::error!(target: "ledgerdesk::proxy", "{} {}", status.as_u16(), message);
                (status, Json(style.body(message))).into_response()
            }
        }
    }
}
