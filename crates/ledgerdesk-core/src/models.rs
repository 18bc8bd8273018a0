//! Mirrors of the records served by the upstream ledger API
//!
//! The upstream owns these shapes; every field is defaulted so that a
//! partially populated record still renders. Unknown `meta_data` keys are
//! kept in `extra` so nothing is dropped on a round trip.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::types::{IdentityType, TransactionType};

/// External pseudo-account used as the counterparty for deposits and withdrawals
pub const WORLD_ACCOUNT: &str = "@WorldUSD";

/// Minor units per major unit for every amount this app submits
pub const PRECISION: i64 = 100;

/// Timestamp the upstream uses for "never"
const ZERO_TIME: &str = "0001-01-01T00:00:00Z";

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ==================== Identity ====================

/// Customer or organization record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identity_id: String,
    #[serde(default)]
    pub identity_type: IdentityType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub other_names: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dob: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nationality: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub street: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Free-form, may hold `verification_data`
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta_data: Map<String, Value>,
}

impl Identity {
    /// Organization name, or "first last" for individuals
    pub fn display_name(&self) -> String {
        if self.identity_type == IdentityType::Organization && !self.organization_name.is_empty() {
            return self.organization_name.clone();
        }
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.identity_id.clone()
        } else {
            name.to_string()
        }
    }

    /// `meta_data.verification_data.verification_status`, if present
    pub fn verification_status(&self) -> Option<&str> {
        self.meta_data
            .get("verification_data")?
            .get("verification_status")?
            .as_str()
    }
}

// ==================== Ledger ====================

/// Ledger metadata shown on list and detail views
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Logical grouping of balances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub ledger_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta_data: LedgerMeta,
}

/// Body of a ledger create or update call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRequest {
    pub name: String,
    #[serde(default)]
    pub meta_data: LedgerMeta,
}

// ==================== Balance ====================

/// Card attributes attached to a card balance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardDetails {
    #[serde(default)]
    pub masked_number: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(rename = "type", default)]
    pub card_type: String,
}

/// Wallet/card metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_details: Option<CardDetails>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A wallet or card balance. Money fields are minor units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub balance_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ledger_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub identity_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub credit_balance: i64,
    #[serde(default)]
    pub debit_balance: i64,
    #[serde(default)]
    pub inflight_balance: i64,
    #[serde(default)]
    pub inflight_credit_balance: i64,
    #[serde(default)]
    pub inflight_debit_balance: i64,
    #[serde(default)]
    pub currency_multiplier: f64,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub inflight_expires_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta_data: BalanceMeta,
}

impl Balance {
    /// Card balances carry `wallet_type: card`
    pub fn is_card(&self) -> bool {
        self.meta_data.wallet_type.as_deref() == Some("card")
    }

    /// Whether an inflight hold has a real expiry
    pub fn has_inflight_expiry(&self) -> bool {
        matches!(self.inflight_expires_at.as_deref(), Some(ts) if !ts.is_empty() && ts != ZERO_TIME)
    }

    pub fn status(&self) -> &str {
        self.meta_data.status.as_deref().unwrap_or("unknown")
    }
}

/// Body of a balance (wallet or card) create call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_id: Option<String>,
    pub identity_id: String,
    pub currency: String,
    pub meta_data: BalanceMeta,
}

// ==================== Transaction ====================

/// A posted, held or voided transaction as returned upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub precision: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub destination: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reference: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta_data: Map<String, Value>,
}

impl Transaction {
    pub fn transaction_type(&self) -> Option<&str> {
        self.meta_data.get("transaction_type")?.as_str()
    }

    /// Major-unit `amount` rendered like a balance, e.g. `1,234.56 USD`
    pub fn display_amount(&self) -> String {
        let minor = self
            .amount
            .checked_mul(Decimal::from(PRECISION))
            .and_then(|v| v.round().to_i64())
            .unwrap_or_default();
        crate::money::format_money(minor, &self.currency)
    }
}

/// `meta_data` attached to every transaction this app submits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// Body of a transaction create or hold call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Minor units
    pub amount: i64,
    pub precision: i64,
    pub reference: String,
    pub description: String,
    pub currency: String,
    pub source: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_overdraft: Option<bool>,
    pub meta_data: TransactionMeta,
}

/// Body of the upstream `/api-keys` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRequest {
    pub name: String,
    pub owner: String,
    pub scopes: Vec<String>,
    pub expires_at: String,
}

/// Scopes granted to keys created from the CLI
pub const DEFAULT_API_KEY_SCOPES: &[&str] = &[
    "ledgers:read",
    "ledgers:write",
    "balances:read",
    "balances:write",
    "transactions:read",
    "transactions:write",
];
