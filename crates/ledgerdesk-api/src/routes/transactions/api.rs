//! Transactions API endpoints - `/api/transactions` proxy plus deposit and transfer shortcuts

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use ledgerdesk_core::{transfers, ReferenceKind, TransactionAction};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ErrorStyle};
use crate::routes::proxy::{
    envelope, forward, json_body, optional_json_body, relay, require, segment, to_body, ApiResult,
};
use crate::AppState;

const STYLE: ErrorStyle = ErrorStyle::Plain;

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
    #[serde(rename = "ledgerId")]
    pub ledger_id: Option<String>,
    #[serde(rename = "balanceId")]
    pub balance_id: Option<String>,
    pub action: Option<String>,
}

impl TransactionQuery {
    /// Upstream path for a GET, most specific parameter first
    pub fn upstream_path(&self) -> String {
        let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        if let Some(id) = non_blank(&self.transaction_id) {
            format!("/transactions/{}", segment(&id))
        } else if let Some(ledger) = non_blank(&self.ledger_id) {
            format!("/ledgers/{}/transactions", segment(&ledger))
        } else if let Some(balance) = non_blank(&self.balance_id) {
            format!("/balances/{}/transactions", segment(&balance))
        } else {
            "/transactions".to_string()
        }
    }

    fn action(&self) -> Result<Option<TransactionAction>, ApiError> {
        match self.action.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            None => Ok(None),
            Some(action) => action
                .parse::<TransactionAction>()
                .map(Some)
                .map_err(|e: String| ApiError::bad_request(STYLE, e)),
        }
    }
}

pub async fn api_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> ApiResult {
    let path = query.upstream_path();
    relay(&state, Method::GET, &path, None, StatusCode::OK, STYLE, "Error fetching transactions").await
}

/// Create, or drive the hold/commit/void lifecycle when `?action` is given
pub async fn api_transaction_post(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
    body: Bytes,
) -> ApiResult {
    match query.action()? {
        None => {
            let body: Value = json_body(STYLE, &body)?;
            relay(&state, Method::POST, "/transactions", Some(&body), StatusCode::CREATED, STYLE, "Error creating transaction").await
        }
        Some(TransactionAction::Hold) => {
            let body: Value = json_body(STYLE, &body)?;
            relay(&state, Method::POST, "/transactions/hold", Some(&body), StatusCode::OK, STYLE, "Error holding transaction").await
        }
        Some(action) => {
            let id = require(&query.transaction_id, STYLE, "Transaction ID is required")?;
            let body = optional_json_body(STYLE, &body)?;
            let path = format!("/transactions/{}/{}", segment(id), action);
            let message = format!("Error during transaction {}", action);
            relay(&state, Method::POST, &path, body.as_ref(), StatusCode::OK, STYLE, &message).await
        }
    }
}

pub async fn api_transaction_detail(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let path = format!("/transactions/{}", segment(&id));
    relay(&state, Method::GET, &path, None, StatusCode::OK, STYLE, "Error fetching transaction").await
}

pub async fn api_transaction_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let body: Value = json_body(STYLE, &body)?;
    let path = format!("/transactions/{}", segment(&id));
    relay(&state, Method::PUT, &path, Some(&body), StatusCode::OK, STYLE, "Error updating transaction").await
}

pub async fn api_transaction_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let path = format!("/transactions/{}", segment(&id));
    relay(&state, Method::DELETE, &path, None, StatusCode::OK, STYLE, "Error deleting transaction").await
}

// ==================== Deposit / transfer shortcuts ====================

/// `POST /api/transactions/deposit`, amount in minor units
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepositBody {
    pub balance_id: String,
    pub amount: i64,
    pub currency: Option<String>,
    pub reference: Option<String>,
    pub description: Option<String>,
}

/// `POST /api/transactions/transfer`, amount in minor units
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferBody {
    pub source_balance_id: String,
    pub destination_balance_id: String,
    pub amount: i64,
    pub currency: Option<String>,
    pub reference: Option<String>,
    pub description: Option<String>,
}

fn reference_or(reference: Option<String>, kind: ReferenceKind) -> String {
    reference
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| kind.generate())
}

fn currency_or_default(state: &AppState, currency: Option<String>) -> String {
    currency
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.config.wallets.default_currency.clone())
}

pub async fn api_deposit(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let style = ErrorStyle::Envelope;
    let body: DepositBody = json_body(style, &body)?;
    if body.balance_id.trim().is_empty() || body.amount <= 0 {
        return Err(ApiError::bad_request(style, "Balance ID and a positive amount are required"));
    }

    let request = transfers::deposit(
        body.balance_id.trim(),
        body.amount,
        &currency_or_default(&state, body.currency),
        reference_or(body.reference, ReferenceKind::Deposit),
        body.description.as_deref(),
    );
    let upstream_body = to_body(style, &request)?;
    let data = forward(&state, Method::POST, "/transactions", Some(&upstream_body), style, "Failed to process deposit").await?;
    Ok(envelope(data))
}

pub async fn api_transfer(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let style = ErrorStyle::Envelope;
    let body: TransferBody = json_body(style, &body)?;
    if body.source_balance_id.trim().is_empty()
        || body.destination_balance_id.trim().is_empty()
        || body.amount <= 0
    {
        return Err(ApiError::bad_request(
            style,
            "Source balance, destination balance and a positive amount are required",
        ));
    }

    let request = transfers::internal_transfer(
        body.source_balance_id.trim(),
        body.destination_balance_id.trim(),
        body.amount,
        &currency_or_default(&state, body.currency),
        reference_or(body.reference, ReferenceKind::Transfer),
        body.description.as_deref(),
    );
    let upstream_body = to_body(style, &request)?;
    let data = forward(&state, Method::POST, "/transactions", Some(&upstream_body), style, "Failed to process transfer").await?;
    Ok(envelope(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use serde_json::json;

    fn query(tx: Option<&str>, ledger: Option<&str>, balance: Option<&str>) -> TransactionQuery {
        TransactionQuery {
            transaction_id: tx.map(str::to_string),
            ledger_id: ledger.map(str::to_string),
            balance_id: balance.map(str::to_string),
            action: None,
        }
    }

    #[test]
    fn test_upstream_path_selection() {
        assert_eq!(query(None, None, None).upstream_path(), "/transactions");
        assert_eq!(query(Some("txn_1"), Some("ldg_1"), None).upstream_path(), "/transactions/txn_1");
        assert_eq!(query(None, Some("ldg_1"), Some("bln_1")).upstream_path(), "/ledgers/ldg_1/transactions");
        assert_eq!(query(None, Some(" "), Some("bln_1")).upstream_path(), "/balances/bln_1/transactions");
    }

    #[tokio::test]
    async fn test_create_and_lifecycle_statuses() {
        let (app, mock, _dir) = test_app().await;
        let tx = json!({"amount": 100, "source": "bln_a", "destination": "bln_b"});

        let res = call(&app, "POST", "/api/transactions", Some(tx.clone())).await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(mock.last().path, "/transactions");

        let res = call(&app, "POST", "/api/transactions?action=hold", Some(tx)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(mock.last().path, "/transactions/hold");

        let res = call(&app, "POST", "/api/transactions?action=commit&transactionId=txn_1", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(mock.last().path, "/transactions/txn_1/commit");

        let res = call(&app, "POST", "/api/transactions?action=void&transactionId=txn_2", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(mock.last().path, "/transactions/txn_2/void");
        assert_eq!(mock.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_lifecycle_rejections() {
        let (app, mock, _dir) = test_app().await;

        let res = call(&app, "POST", "/api/transactions?action=commit", None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json(), json!({"error": "Transaction ID is required"}));

        let res = call(&app, "POST", "/api/transactions?action=refund&transactionId=txn_1", None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json(), json!({"error": "Invalid transaction action: refund"}));

        let res = call(&app, "POST", "/api/transactions", None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_deposit_builds_world_transaction() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("POST", "/transactions", 201, json!({"transaction_id": "txn_9", "status": "QUEUED"}));

        let res = call(
            &app,
            "POST",
            "/api/transactions/deposit",
            Some(json!({"balanceId": "bln_1", "amount": 2500})),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json(), json!({"success": true, "data": {"transaction_id": "txn_9", "status": "QUEUED"}}));

        let sent = mock.last().body;
        assert_eq!(sent["source"], "@WorldUSD");
        assert_eq!(sent["destination"], "bln_1");
        assert_eq!(sent["amount"], 2500);
        assert_eq!(sent["precision"], 100);
        assert_eq!(sent["currency"], "USD");
        assert_eq!(sent["allow_overdraft"], true);
        assert_eq!(sent["meta_data"]["transaction_type"], "deposit");
        assert!(sent["reference"].as_str().unwrap().starts_with("DEP-"));
    }

    #[tokio::test]
    async fn test_transfer_keeps_reference_and_envelopes_errors() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("POST", "/transactions", 400, json!({"error": "insufficient funds"}));

        let res = call(
            &app,
            "POST",
            "/api/transactions/transfer",
            Some(json!({
                "sourceBalanceId": "bln_a",
                "destinationBalanceId": "bln_b",
                "amount": 700,
                "reference": "ref-1",
                "description": "Rent share"
            })),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json(), json!({"success": false, "message": "insufficient funds"}));

        let sent = mock.last().body;
        assert_eq!(sent["reference"], "ref-1");
        assert_eq!(sent["description"], "Rent share");
        assert_eq!(sent["meta_data"]["purpose"], "wallet_transfer");

        let res = call(&app, "POST", "/api/transactions/transfer", Some(json!({"sourceBalanceId": "bln_a"}))).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json()["success"], false);
    }
}
