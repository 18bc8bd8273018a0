//! Balances API endpoints - `/api/balances` proxy

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ErrorStyle;
use crate::routes::proxy::{json_body, relay, segment, ApiResult};
use crate::AppState;

const STYLE: ErrorStyle = ErrorStyle::Plain;

#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    #[serde(rename = "balanceId")]
    pub balance_id: Option<String>,
    #[serde(rename = "ledgerId")]
    pub ledger_id: Option<String>,
    /// Any value other than `false`/`0` asks for the balance history
    pub history: Option<String>,
}

impl BalanceQuery {
    fn wants_history(&self) -> bool {
        matches!(self.history.as_deref(), Some(v) if v != "false" && v != "0")
    }

    /// Upstream path selected by the query parameters
    pub fn upstream_path(&self) -> String {
        let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        match (non_blank(&self.balance_id), non_blank(&self.ledger_id)) {
            (Some(id), _) if self.wants_history() => format!("/balances/{}/history", segment(&id)),
            (Some(id), _) => format!("/balances/{}", segment(&id)),
            (None, Some(ledger)) => format!("/ledgers/{}/balances", segment(&ledger)),
            (None, None) => "/balances".to_string(),
        }
    }
}

pub async fn api_balances(State(state): State<AppState>, Query(query): Query<BalanceQuery>) -> ApiResult {
    let path = query.upstream_path();
    relay(&state, Method::GET, &path, None, StatusCode::OK, STYLE, "Failed to fetch balances").await
}

pub async fn api_balance_detail(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let path = format!("/balances/{}", segment(&id));
    relay(&state, Method::GET, &path, None, StatusCode::OK, STYLE, "Failed to fetch balance").await
}

pub async fn api_balance_create(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let body: Value = json_body(STYLE, &body)?;
    relay(&state, Method::POST, "/balances", Some(&body), StatusCode::CREATED, STYLE, "Failed to create balance").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use serde_json::json;

    fn query(balance: Option<&str>, ledger: Option<&str>, history: Option<&str>) -> BalanceQuery {
        BalanceQuery {
            balance_id: balance.map(str::to_string),
            ledger_id: ledger.map(str::to_string),
            history: history.map(str::to_string),
        }
    }

    #[test]
    fn test_upstream_path_selection() {
        assert_eq!(query(None, None, None).upstream_path(), "/balances");
        assert_eq!(query(Some("b1"), None, None).upstream_path(), "/balances/b1");
        assert_eq!(query(Some("b1"), None, Some("true")).upstream_path(), "/balances/b1/history");
        assert_eq!(query(Some("b1"), None, Some("false")).upstream_path(), "/balances/b1");
        assert_eq!(query(None, Some("l1"), None).upstream_path(), "/ledgers/l1/balances");
        assert_eq!(query(Some(""), Some("l1"), None).upstream_path(), "/ledgers/l1/balances");
    }

    #[tokio::test]
    async fn test_get_variants_hit_upstream() {
        let (app, mock, _dir) = test_app().await;
        for (uri, expected) in [
            ("/api/balances", "/balances"),
            ("/api/balances?balanceId=bln_1", "/balances/bln_1"),
            ("/api/balances?balanceId=bln_1&history=true", "/balances/bln_1/history"),
            ("/api/balances?ledgerId=ldg_1", "/ledgers/ldg_1/balances"),
            ("/api/balances/bln_2", "/balances/bln_2"),
        ] {
            let res = call(&app, "GET", uri, None).await;
            assert_eq!(res.status, StatusCode::OK, "{}", uri);
            assert_eq!(mock.last().path, expected);
        }
    }

    #[tokio::test]
    async fn test_create_and_errors() {
        let (app, mock, _dir) = test_app().await;
        let body = json!({"ledger_id": "ldg_1", "currency": "USD"});
        let res = call(&app, "POST", "/api/balances", Some(body.clone())).await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(mock.last().body, body);

        mock.reply("POST", "/balances", 400, json!({"error": "currency required"}));
        let res = call(&app, "POST", "/api/balances", Some(json!({}))).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json(), json!({"error": "currency required"}));

        let res = call(&app, "DELETE", "/api/balances", None).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers["allow"], "GET, POST");
    }
}
