//! Identities API endpoints - `/api/identities` proxy

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ErrorStyle;
use crate::routes::proxy::{envelope, forward, json_body, relay, segment, ApiResult};
use crate::AppState;

const STYLE: ErrorStyle = ErrorStyle::Flagged;

pub async fn api_identities(State(state): State<AppState>) -> ApiResult {
    relay(&state, Method::GET, "/identities", None, StatusCode::OK, STYLE, "Error fetching identities").await
}

pub async fn api_identity_create(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let body: Value = json_body(STYLE, &body)?;
    relay(&state, Method::POST, "/identities", Some(&body), StatusCode::CREATED, STYLE, "Error creating identity").await
}

pub async fn api_identity_detail(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let path = format!("/identities/{}", segment(&id));
    relay(&state, Method::GET, &path, None, StatusCode::OK, STYLE, "Error fetching identity").await
}

pub async fn api_identity_update(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> ApiResult {
    let body: Value = json_body(STYLE, &body)?;
    let path = format!("/identities/{}", segment(&id));
    relay(&state, Method::PUT, &path, Some(&body), StatusCode::OK, STYLE, "Error updating identity").await
}

pub async fn api_identity_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let path = format!("/identities/{}", segment(&id));
    relay(&state, Method::DELETE, &path, None, StatusCode::NO_CONTENT, STYLE, "Error deleting identity").await
}

/// Simplified individual sign-up body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateIdentityBody {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub customer_id: Option<String>,
}

impl CreateIdentityBody {
    /// Upstream identity for this sign-up, stamped with `registered_at`
    pub fn to_upstream(&self, registered_at: DateTime<Utc>) -> Value {
        json!({
            "identity_type": "individual",
            "first_name": self.first_name,
            "last_name": self.last_name,
            "email_address": self.email,
            "phone_number": self.phone,
            "meta_data": {
                "customer_id": self.customer_id,
                "registration_date": registered_at.to_rfc3339(),
            }
        })
    }
}

/// `POST /api/identities/create`: camelCase body in, `{success, data}` out
pub async fn api_identity_create_from_form(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let style = ErrorStyle::Envelope;
    let body: CreateIdentityBody = json_body(style, &body)?;
    let upstream_body = body.to_upstream(Utc::now());
    let data = forward(&state, Method::POST, "/identities", Some(&upstream_body), style, "Error creating identity").await?;
    Ok(envelope(data))
}
