//! Typed wrappers over the local `/api/*` proxy routes
//!
//! Each function is exactly one HTTP call. Non-2xx replies become
//! `ClientError::Upstream` and are left to the caller to handle.

use ledgerdesk_core::{
    Balance, BalanceRequest, Ledger, LedgerRequest, Transaction, TransactionRequest,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{extract_message, ClientError};

/// HTTP client bound to a running proxy, e.g. `http://localhost:8081`
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn ledgers(&self) -> LedgerService<'_> {
        LedgerService { client: self }
    }

    pub fn balances(&self) -> BalanceService<'_> {
        BalanceService { client: self }
    }

    pub fn transactions(&self) -> TransactionService<'_> {
        TransactionService { client: self }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        if !status.is_success() {
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                message: extract_message(&body)
                    .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16())),
            });
        }
        Ok(serde_json::from_value(body)?)
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Option<Value>, ClientError> {
    Ok(Some(serde_json::to_value(body)?))
}

pub struct LedgerService<'a> {
    client: &'a ProxyClient,
}

impl LedgerService<'_> {
    pub async fn get_all_ledgers(&self) -> Result<Vec<Ledger>, ClientError> {
        self.client.call(Method::GET, "/api/ledgers", &[], None).await
    }

    pub async fn get_ledger(&self, ledger_id: &str) -> Result<Ledger, ClientError> {
        self.client
            .call(Method::GET, "/api/ledgers", &[("ledgerId", ledger_id)], None)
            .await
    }

    pub async fn create_ledger(&self, request: &LedgerRequest) -> Result<Ledger, ClientError> {
        self.client
            .call(Method::POST, "/api/ledgers", &[], to_body(request)?)
            .await
    }

    pub async fn update_ledger(
        &self,
        ledger_id: &str,
        request: &LedgerRequest,
    ) -> Result<Ledger, ClientError> {
        self.client
            .call(
                Method::PATCH,
                "/api/ledgers",
                &[("ledgerId", ledger_id)],
                to_body(request)?,
            )
            .await
    }

    pub async fn delete_ledger(&self, ledger_id: &str) -> Result<(), ClientError> {
        let _: Value = self
            .client
            .call(Method::DELETE, "/api/ledgers", &[("ledgerId", ledger_id)], None)
            .await?;
        Ok(())
    }
}

pub struct BalanceService<'a> {
    client: &'a ProxyClient,
}

impl BalanceService<'_> {
    pub async fn get_all_balances(&self) -> Result<Vec<Balance>, ClientError> {
        self.client.call(Method::GET, "/api/balances", &[], None).await
    }

    pub async fn get_balance(&self, balance_id: &str) -> Result<Balance, ClientError> {
        self.client
            .call(Method::GET, "/api/balances", &[("balanceId", balance_id)], None)
            .await
    }

    pub async fn create_balance(&self, request: &BalanceRequest) -> Result<Balance, ClientError> {
        self.client
            .call(Method::POST, "/api/balances", &[], to_body(request)?)
            .await
    }

    pub async fn get_balances_by_ledger(&self, ledger_id: &str) -> Result<Vec<Balance>, ClientError> {
        self.client
            .call(Method::GET, "/api/balances", &[("ledgerId", ledger_id)], None)
            .await
    }

    /// History entries are passed through untyped
    pub async fn get_balance_history(&self, balance_id: &str) -> Result<Value, ClientError> {
        self.client
            .call(
                Method::GET,
                "/api/balances",
                &[("balanceId", balance_id), ("history", "true")],
                None,
            )
            .await
    }
}

pub struct TransactionService<'a> {
    client: &'a ProxyClient,
}

impl TransactionService<'_> {
    pub async fn get_all_transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        self.client.call(Method::GET, "/api/transactions", &[], None).await
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> Result<Transaction, ClientError> {
        self.client
            .call(
                Method::GET,
                "/api/transactions",
                &[("transactionId", transaction_id)],
                None,
            )
            .await
    }

    pub async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<Transaction, ClientError> {
        self.client
            .call(Method::POST, "/api/transactions", &[], to_body(request)?)
            .await
    }

    pub async fn get_transactions_by_ledger(
        &self,
        ledger_id: &str,
    ) -> Result<Vec<Transaction>, ClientError> {
        self.client
            .call(Method::GET, "/api/transactions", &[("ledgerId", ledger_id)], None)
            .await
    }

    pub async fn get_transactions_by_balance(
        &self,
        balance_id: &str,
    ) -> Result<Vec<Transaction>, ClientError> {
        self.client
            .call(Method::GET, "/api/transactions", &[("balanceId", balance_id)], None)
            .await
    }

    /// Create a pending transaction whose funds sit in the inflight balance
    pub async fn hold_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<Transaction, ClientError> {
        self.client
            .call(
                Method::POST,
                "/api/transactions",
                &[("action", "hold")],
                to_body(request)?,
            )
            .await
    }

    pub async fn commit_transaction(&self, transaction_id: &str) -> Result<Transaction, ClientError> {
        self.client
            .call(
                Method::POST,
                "/api/transactions",
                &[("transactionId", transaction_id), ("action", "commit")],
                None,
            )
            .await
    }

    pub async fn void_transaction(&self, transaction_id: &str) -> Result<Transaction, ClientError> {
        self.client
            .call(
                Method::POST,
                "/api/transactions",
                &[("transactionId", transaction_id), ("action", "void")],
                None,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::{Method as AxumMethod, StatusCode};
    use axum::routing::any;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

    /// Stand-in for the proxy: echoes the query back and records each call
    async fn spawn_proxy() -> (ProxyClient, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/api/ledgers",
                any(
                    |State(calls): State<Calls>, method: AxumMethod, Query(q): Query<HashMap<String, String>>| async move {
                        calls.lock().unwrap().push((method.to_string(), q.clone()));
                        match (method.as_str(), q.get("ledgerId")) {
                            ("GET", None) => (StatusCode::OK, Json(json!([{"ledger_id": "ldg_1", "name": "Main"}]))),
                            ("GET", Some(id)) if id == "missing" => {
                                (StatusCode::NOT_FOUND, Json(json!({"error": "ledger not found"})))
                            }
                            ("GET", Some(id)) => (StatusCode::OK, Json(json!({"ledger_id": id, "name": "Main"}))),
                            ("POST", _) => (StatusCode::CREATED, Json(json!({"ledger_id": "ldg_new", "name": "New"}))),
                            _ => (StatusCode::OK, Json(json!({}))),
                        }
                    },
                ),
            )
            .route(
                "/api/transactions",
                any(
                    |State(calls): State<Calls>, method: AxumMethod, Query(q): Query<HashMap<String, String>>| async move {
                        calls.lock().unwrap().push((method.to_string(), q.clone()));
                        let status = match q.get("action").map(String::as_str) {
                            Some("commit") => "APPLIED",
                            Some("void") => "VOID",
                            Some("hold") => "INFLIGHT",
                            _ => "QUEUED",
                        };
                        Json(json!({"transaction_id": q.get("transactionId").cloned().unwrap_or_default(), "status": status}))
                    },
                ),
            )
            .with_state(calls.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (ProxyClient::new(&format!("http://{}/", addr)), calls)
    }

    #[tokio::test]
    async fn test_ledger_service_calls() {
        let (client, calls) = spawn_proxy().await;
        let ledgers = client.ledgers().get_all_ledgers().await.unwrap();
        assert_eq!(ledgers.len(), 1);

        let ledger = client.ledgers().get_ledger("ldg_9").await.unwrap();
        assert_eq!(ledger.ledger_id, "ldg_9");

        let created = client
            .ledgers()
            .create_ledger(&LedgerRequest {
                name: "New".to_string(),
                meta_data: Default::default(),
            })
            .await
            .unwrap();
        assert_eq!(created.ledger_id, "ldg_new");

        client.ledgers().delete_ledger("ldg_9").await.unwrap();

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[3].0, "DELETE");
        assert_eq!(calls[3].1.get("ledgerId").map(String::as_str), Some("ldg_9"));
    }

    #[tokio::test]
    async fn test_error_propagates_message() {
        let (client, _) = spawn_proxy().await;
        let err = client.ledgers().get_ledger("missing").await.unwrap_err();
        assert_eq!(err.status(), 404);
        assert_eq!(err.to_string(), "ledger not found");
    }

    #[tokio::test]
    async fn test_transaction_lifecycle_queries() {
        let (client, calls) = spawn_proxy().await;
        let committed = client.transactions().commit_transaction("txn_1").await.unwrap();
        assert_eq!(committed.status, "APPLIED");
        let voided = client.transactions().void_transaction("txn_2").await.unwrap();
        assert_eq!(voided.status, "VOID");

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls[0].1.get("action").map(String::as_str), Some("commit"));
        assert_eq!(calls[0].1.get("transactionId").map(String::as_str), Some("txn_1"));
        assert_eq!(calls[1].0, "POST");
    }
}
