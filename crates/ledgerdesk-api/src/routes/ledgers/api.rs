//! Ledgers API endpoints - `/api/ledgers` proxy

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ErrorStyle;
use crate::routes::proxy::{json_body, relay, require, segment, ApiResult};
use crate::AppState;

const STYLE: ErrorStyle = ErrorStyle::Plain;

#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    #[serde(rename = "ledgerId")]
    pub ledger_id: Option<String>,
}

/// All ledgers, or one when `?ledgerId` is given
pub async fn api_ledgers(State(state): State<AppState>, Query(query): Query<LedgerQuery>) -> ApiResult {
    match query.ledger_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            let path = format!("/ledgers/{}", segment(id));
            relay(&state, Method::GET, &path, None, StatusCode::OK, STYLE, "Error fetching ledger").await
        }
        None => relay(&state, Method::GET, "/ledgers", None, StatusCode::OK, STYLE, "Error fetching ledgers").await,
    }
}

pub async fn api_ledger_detail(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let path = format!("/ledgers/{}", segment(&id));
    relay(&state, Method::GET, &path, None, StatusCode::OK, STYLE, "Error fetching ledger").await
}

pub async fn api_ledger_create(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let body: Value = json_body(STYLE, &body)?;
    relay(&state, Method::POST, "/ledgers", Some(&body), StatusCode::CREATED, STYLE, "Error creating ledger").await
}

pub async fn api_ledger_update(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
    body: Bytes,
) -> ApiResult {
    let id = require(&query.ledger_id, STYLE, "Ledger ID is required")?;
    let body: Value = json_body(STYLE, &body)?;
    let path = format!("/ledgers/{}", segment(id));
    relay(&state, Method::PATCH, &path, Some(&body), StatusCode::OK, STYLE, "Error updating ledger").await
}

pub async fn api_ledger_delete(State(state): State<AppState>, Query(query): Query<LedgerQuery>) -> ApiResult {
    let id = require(&query.ledger_id, STYLE, "Ledger ID is required")?;
    let path = format!("/ledgers/{}", segment(id));
    relay(&state, Method::DELETE, &path, None, StatusCode::OK, STYLE, "Error deleting ledger").await
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_and_single() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/ledgers", 200, json!([{"ledger_id": "ldg_1"}]));

        let res = call(&app, "GET", "/api/ledgers", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json(), json!([{"ledger_id": "ldg_1"}]));
        assert_eq!(mock.last().auth.as_deref(), Some("test-key"));

        let res = call(&app, "GET", "/api/ledgers?ledgerId=ldg_1", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(mock.last().path, "/ledgers/ldg_1");

        call(&app, "GET", "/api/ledgers/ldg_2", None).await;
        assert_eq!(mock.last().path, "/ledgers/ldg_2");
    }

    #[tokio::test]
    async fn test_create_returns_201() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("POST", "/ledgers", 200, json!({"ledger_id": "ldg_new", "name": "Ops"}));

        let res = call(&app, "POST", "/api/ledgers", Some(json!({"name": "Ops"}))).await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.json()["ledger_id"], "ldg_new");
        let sent = mock.last();
        assert_eq!(sent.method, "POST");
        assert_eq!(sent.body, json!({"name": "Ops"}));
    }

    #[tokio::test]
    async fn test_update_and_delete_require_id() {
        let (app, mock, _dir) = test_app().await;

        let res = call(&app, "PATCH", "/api/ledgers", Some(json!({"name": "x"}))).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json(), json!({"error": "Ledger ID is required"}));

        let res = call(&app, "DELETE", "/api/ledgers", None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(mock.calls().is_empty());

        let res = call(&app, "DELETE", "/api/ledgers?ledgerId=ldg_1", None).await;
        assert_eq!(res.status, StatusCode::OK);
        let sent = mock.last();
        assert_eq!((sent.method.as_str(), sent.path.as_str()), ("DELETE", "/ledgers/ldg_1"));
    }

    #[tokio::test]
    async fn test_upstream_error_relayed() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/ledgers/missing", 404, json!({"message": "ledger not found"}));

        let res = call(&app, "GET", "/api/ledgers?ledgerId=missing", None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.json(), json!({"error": "ledger not found"}));
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let (app, _, _dir) = test_app().await;
        let res = call(&app, "PUT", "/api/ledgers", None).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers["allow"], "GET, POST, PATCH, DELETE");
        assert_eq!(res.text(), "Method PUT Not Allowed");
    }
}
