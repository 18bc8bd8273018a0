//! Wallets API endpoint - open a wallet in the configured default ledger

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use ledgerdesk_core::transfers;
use serde::Deserialize;

use crate::error::{ApiError, ErrorStyle};
use crate::routes::proxy::{envelope, forward, json_body, to_body, ApiResult};
use crate::AppState;

const STYLE: ErrorStyle = ErrorStyle::Envelope;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateWalletBody {
    pub identity_id: String,
    pub currency: String,
    pub wallet_type: Option<String>,
}

pub async fn api_wallet_create(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let body: CreateWalletBody = json_body(STYLE, &body)?;
    if body.identity_id.trim().is_empty() || body.currency.trim().is_empty() {
        return Err(ApiError::bad_request(STYLE, "Identity ID and currency are required"));
    }

    let request = transfers::wallet_request(
        state.config.wallets.default_ledger_id.as_deref(),
        body.identity_id.trim(),
        body.currency.trim(),
        body.wallet_type.as_deref(),
    );
    let upstream_body = to_body(STYLE, &request)?;
    let data = forward(&state, Method::POST, "/ledger-balances", Some(&upstream_body), STYLE, "Failed to create wallet").await?;
    Ok(envelope(data))
}
