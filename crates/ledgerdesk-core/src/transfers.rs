//! Builders for the transaction bodies this app submits upstream
//!
//! Every builder fixes `precision` at 100 and expects `amount` already in
//! minor units.

use serde_json::Map;

use crate::error::{CoreError, CoreResult};
use crate::models::{
    Balance, BalanceMeta, BalanceRequest, TransactionMeta, TransactionRequest, PRECISION,
    WORLD_ACCOUNT,
};
use crate::types::TransactionType;

fn describe(description: Option<&str>, fallback: &str) -> String {
    match description.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

/// External money into `balance_id`
pub fn deposit(
    balance_id: &str,
    amount: i64,
    currency: &str,
    reference: String,
    description: Option<&str>,
) -> TransactionRequest {
    TransactionRequest {
        amount,
        precision: PRECISION,
        reference,
        description: describe(description, "Deposit to wallet"),
        currency: currency.to_string(),
        source: WORLD_ACCOUNT.to_string(),
        destination: balance_id.to_string(),
        allow_overdraft: Some(true),
        meta_data: TransactionMeta {
            transaction_type: TransactionType::Deposit,
            channel: Some("bank_transfer".to_string()),
            purpose: None,
        },
    }
}

/// Money out of `balance_id` to the outside world
pub fn withdrawal(
    balance_id: &str,
    amount: i64,
    currency: &str,
    reference: String,
    description: Option<&str>,
) -> TransactionRequest {
    TransactionRequest {
        amount,
        precision: PRECISION,
        reference,
        description: describe(description, "Withdrawal from wallet"),
        currency: currency.to_string(),
        source: balance_id.to_string(),
        destination: WORLD_ACCOUNT.to_string(),
        allow_overdraft: Some(false),
        meta_data: TransactionMeta {
            transaction_type: TransactionType::Withdrawal,
            channel: Some("wallet_transfer".to_string()),
            purpose: None,
        },
    }
}

/// Wallet to wallet
pub fn internal_transfer(
    source: &str,
    destination: &str,
    amount: i64,
    currency: &str,
    reference: String,
    description: Option<&str>,
) -> TransactionRequest {
    TransactionRequest {
        amount,
        precision: PRECISION,
        reference,
        description: describe(description, "Transfer between wallets"),
        currency: currency.to_string(),
        source: source.to_string(),
        destination: destination.to_string(),
        allow_overdraft: None,
        meta_data: TransactionMeta {
            transaction_type: TransactionType::InternalTransfer,
            channel: None,
            purpose: Some("wallet_transfer".to_string()),
        },
    }
}

/// Wallet to card balance
pub fn fund_card(
    source_wallet: &str,
    card: &Balance,
    amount: i64,
    reference: String,
) -> TransactionRequest {
    TransactionRequest {
        amount,
        precision: PRECISION,
        reference,
        description: "Transfer to card wallet".to_string(),
        currency: card.currency.clone(),
        source: source_wallet.to_string(),
        destination: card.balance_id.clone(),
        allow_overdraft: None,
        meta_data: TransactionMeta {
            transaction_type: TransactionType::InternalTransfer,
            channel: None,
            purpose: Some("fund_card".to_string()),
        },
    }
}

/// Reject a transfer the source balance cannot cover
pub fn ensure_sufficient(source: &Balance, amount: i64) -> CoreResult<()> {
    if amount > source.balance {
        return Err(CoreError::InsufficientBalance {
            available: source.balance,
            requested: amount,
        });
    }
    Ok(())
}

/// Body for opening a wallet in the default ledger
pub fn wallet_request(
    default_ledger_id: Option<&str>,
    identity_id: &str,
    currency: &str,
    wallet_type: Option<&str>,
) -> BalanceRequest {
    let requested = wallet_type.map(str::trim).filter(|t| !t.is_empty());
    // purpose follows the requested type, so an omitted type is not "general"
    let purpose = if requested == Some("main") { "general" } else { "card_payments" };
    let wallet_type = requested.unwrap_or("main");

    BalanceRequest {
        ledger_id: default_ledger_id.map(str::to_string),
        identity_id: identity_id.to_string(),
        currency: currency.to_string(),
        meta_data: BalanceMeta {
            status: Some("active".to_string()),
            purpose: Some(purpose.to_string()),
            wallet_type: Some(wallet_type.to_string()),
            card_details: None,
            extra: Map::new(),
        },
    }
}
