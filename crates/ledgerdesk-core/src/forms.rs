//! Form inputs and their validation
//!
//! Each form deserializes straight from an urlencoded body and turns into
//! the upstream request body once `validate` passes.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::error::{CoreError, CoreResult, FieldError};
use crate::models::{BalanceMeta, BalanceRequest, CardDetails, Identity, LedgerMeta, LedgerRequest};
use crate::types::IdentityType;

static EXPIRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("valid expiry regex"));

fn min_chars(errors: &mut Vec<FieldError>, field: &str, value: &str, min: usize, message: &str) {
    if value.trim().chars().count() < min {
        errors.push(FieldError::new(field, message));
    }
}

fn required(errors: &mut Vec<FieldError>, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, message));
    }
}

fn finish(errors: Vec<FieldError>) -> CoreResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation { fields: errors })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// ==================== Ledger ====================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project_owner: String,
    #[serde(default)]
    pub description: String,
}

impl LedgerForm {
    pub fn validate(&self) -> CoreResult<()> {
        let mut errors = Vec::new();
        min_chars(&mut errors, "name", &self.name, 2, "Ledger name must be at least 2 characters.");
        min_chars(
            &mut errors,
            "project_owner",
            &self.project_owner,
            2,
            "Project owner must be at least 2 characters.",
        );
        min_chars(
            &mut errors,
            "description",
            &self.description,
            10,
            "Description must be at least 10 characters.",
        );
        finish(errors)
    }

    pub fn to_request(&self) -> LedgerRequest {
        LedgerRequest {
            name: self.name.trim().to_string(),
            meta_data: LedgerMeta {
                project_owner: non_empty(&self.project_owner),
                description: non_empty(&self.description),
                extra: Map::new(),
            },
        }
    }
}

// ==================== Identity ====================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityForm {
    #[serde(default)]
    pub identity_type: String,
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub other_names: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub post_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub customer_id: String,
}

impl IdentityForm {
    fn kind(&self) -> IdentityType {
        self.identity_type.parse().unwrap_or_default()
    }

    pub fn validate(&self) -> CoreResult<()> {
        let mut errors = Vec::new();
        match self.kind() {
            IdentityType::Organization => required(
                &mut errors,
                "organization_name",
                &self.organization_name,
                "Organization name is required",
            ),
            IdentityType::Individual => {
                required(&mut errors, "first_name", &self.first_name, "First name is required");
                required(&mut errors, "last_name", &self.last_name, "Last name is required");
            }
        }
        required(&mut errors, "email_address", &self.email_address, "Email address is required");
        finish(errors)
    }

    /// Build the upstream identity; new records start with a pending manual verification
    pub fn to_identity(&self, now: DateTime<Utc>) -> Identity {
        let mut meta = Map::new();
        if let Some(customer_id) = non_empty(&self.customer_id) {
            meta.insert("customer_id".to_string(), Value::String(customer_id));
        }
        meta.insert(
            "verification_data".to_string(),
            json!({
                "verified_by": "Manual",
                "verification_date": now.to_rfc3339(),
                "verification_status": "pending",
            }),
        );

        let category = non_empty(&self.category).unwrap_or_else(|| "customer".to_string());
        Identity {
            identity_type: self.kind(),
            organization_name: self.organization_name.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            other_names: self.other_names.trim().to_string(),
            gender: self.gender.trim().to_string(),
            dob: self.dob.trim().to_string(),
            email_address: self.email_address.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            nationality: self.nationality.trim().to_string(),
            category,
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            post_code: self.post_code.trim().to_string(),
            country: self.country.trim().to_string(),
            meta_data: meta,
            ..Default::default()
        }
    }
}

// ==================== Wallet ====================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletForm {
    #[serde(default)]
    pub ledger_id: String,
    #[serde(default)]
    pub identity_id: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub wallet_type: String,
    #[serde(default)]
    pub purpose: String,
}

impl WalletForm {
    pub fn validate(&self) -> CoreResult<()> {
        let mut errors = Vec::new();
        required(&mut errors, "ledger_id", &self.ledger_id, "Please select a ledger");
        required(&mut errors, "identity_id", &self.identity_id, "Please select an identity");
        required(&mut errors, "currency", &self.currency, "Currency is required");
        finish(errors)
    }

    pub fn to_request(&self) -> BalanceRequest {
        BalanceRequest {
            ledger_id: non_empty(&self.ledger_id),
            identity_id: self.identity_id.trim().to_string(),
            currency: self.currency.trim().to_uppercase(),
            meta_data: BalanceMeta {
                status: Some("active".to_string()),
                purpose: Some(non_empty(&self.purpose).unwrap_or_else(|| "general".to_string())),
                wallet_type: Some(
                    non_empty(&self.wallet_type).unwrap_or_else(|| "personal".to_string()),
                ),
                card_details: None,
                extra: Map::new(),
            },
        }
    }
}

// ==================== Card balance ====================

/// Why a card expiry was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryError {
    #[error("Expiry date must be in MM/YY format")]
    Format,
    #[error("Card has expired")]
    Expired,
}

/// Normalize keyboard input into `MM/YY`, keeping at most four digits
pub fn format_expiry_input(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).take(4).collect();
    if digits.len() <= 2 {
        digits
    } else {
        format!("{}/{}", &digits[..2], &digits[2..])
    }
}

/// Check a card expiry against `today`.
///
/// Input shorter than `MM/YY` is treated as still being typed and passes.
/// Years compare as two digits.
pub fn validate_card_expiry(expiry: &str, today: NaiveDate) -> Result<(), ExpiryError> {
    if expiry.chars().count() < 5 {
        return Ok(());
    }

    let caps = EXPIRY_RE.captures(expiry).ok_or(ExpiryError::Format)?;
    let month: u32 = caps[1].parse().map_err(|_| ExpiryError::Format)?;
    let year: i32 = caps[2].parse().map_err(|_| ExpiryError::Format)?;

    let current_year = today.year() % 100;
    let current_month = today.month();
    if year < current_year || (year == current_year && month < current_month) {
        return Err(ExpiryError::Expired);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardBalanceForm {
    #[serde(default)]
    pub ledger_id: String,
    #[serde(default)]
    pub identity_id: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub masked_number: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub card_type: String,
}

impl CardBalanceForm {
    pub fn expiry(&self) -> String {
        format_expiry_input(&self.expiry)
    }

    pub fn validate(&self, today: NaiveDate) -> CoreResult<()> {
        let mut errors = Vec::new();
        required(&mut errors, "ledger_id", &self.ledger_id, "Please select a ledger");
        required(&mut errors, "identity_id", &self.identity_id, "Please select an identity");
        required(&mut errors, "currency", &self.currency, "Currency is required");
        if let Err(e) = validate_card_expiry(&self.expiry(), today) {
            errors.push(FieldError::new("expiry", e.to_string()));
        }
        finish(errors)
    }

    pub fn to_request(&self) -> BalanceRequest {
        BalanceRequest {
            ledger_id: non_empty(&self.ledger_id),
            identity_id: self.identity_id.trim().to_string(),
            currency: self.currency.trim().to_uppercase(),
            meta_data: BalanceMeta {
                status: Some("active".to_string()),
                purpose: Some("card_payments".to_string()),
                wallet_type: Some("card".to_string()),
                card_details: Some(CardDetails {
                    masked_number: self.masked_number.trim().to_string(),
                    expiry: self.expiry(),
                    card_type: non_empty(&self.card_type).unwrap_or_else(|| "virtual".to_string()),
                }),
                extra: Map::new(),
            },
        }
    }
}

// ==================== Money movement ====================

/// Deposit or withdrawal form on the wallet detail page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmountForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
}

/// Fund-card form on the card balance detail page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FundCardForm {
    #[serde(default)]
    pub source_wallet: String,
    #[serde(default)]
    pub amount: String,
}

impl FundCardForm {
    pub fn validate(&self) -> CoreResult<()> {
        let mut errors = Vec::new();
        required(&mut errors, "source_wallet", &self.source_wallet, "Please select a wallet and enter an amount");
        required(&mut errors, "amount", &self.amount, "Please select a wallet and enter an amount");
        errors.dedup_by(|a, b| a.message == b.message);
        finish(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 15).unwrap()
    }

    #[test]
    fn test_expiry_invalid_month() {
        assert_eq!(validate_card_expiry("13/29", jan(2024)), Err(ExpiryError::Format));
        assert_eq!(validate_card_expiry("00/29", jan(2024)), Err(ExpiryError::Format));
        assert_eq!(validate_card_expiry("1a/29", jan(2024)), Err(ExpiryError::Format));
    }

    #[test]
    fn test_expiry_past_dates() {
        let feb_2020 = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
        assert_eq!(validate_card_expiry("01/20", feb_2020), Err(ExpiryError::Expired));
        assert_eq!(validate_card_expiry("01/20", jan(2020)), Ok(()));
        assert_eq!(validate_card_expiry("12/19", jan(2020)), Err(ExpiryError::Expired));
    }

    #[test]
    fn test_expiry_future_and_incomplete() {
        assert_eq!(validate_card_expiry("01/99", jan(2026)), Ok(()));
        assert_eq!(validate_card_expiry("01/9", jan(2026)), Ok(()));
        assert_eq!(validate_card_expiry("", jan(2026)), Ok(()));
    }

    #[test]
    fn test_format_expiry_input() {
        assert_eq!(format_expiry_input("0"), "0");
        assert_eq!(format_expiry_input("01"), "01");
        assert_eq!(format_expiry_input("012"), "01/2");
        assert_eq!(format_expiry_input("0129"), "01/29");
        assert_eq!(format_expiry_input("01/29"), "01/29");
        assert_eq!(format_expiry_input("01/2999"), "01/29");
    }

    #[test]
    fn test_ledger_form_lengths() {
        let form = LedgerForm {
            name: "A".to_string(),
            project_owner: "B".to_string(),
            description: "too short".to_string(),
        };
        let err = form.validate().unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "project_owner", "description"]);
        assert_eq!(err.field_errors()[0].message, "Ledger name must be at least 2 characters.");

        let form = LedgerForm {
            name: "Ops".to_string(),
            project_owner: "Finance".to_string(),
            description: "Operating balances".to_string(),
        };
        assert!(form.validate().is_ok());
        let request = form.to_request();
        assert_eq!(request.meta_data.project_owner.as_deref(), Some("Finance"));
    }

    #[test]
    fn test_card_form_request() {
        let form = CardBalanceForm {
            ledger_id: "ldg_1".to_string(),
            identity_id: "idt_1".to_string(),
            currency: "usd".to_string(),
            masked_number: "**** 4242".to_string(),
            expiry: "0130".to_string(),
            card_type: String::new(),
        };
        assert!(form.validate(jan(2026)).is_ok());

        let request = form.to_request();
        assert_eq!(request.currency, "USD");
        assert_eq!(request.meta_data.wallet_type.as_deref(), Some("card"));
        let card = request.meta_data.card_details.unwrap();
        assert_eq!(card.expiry, "01/30");
        assert_eq!(card.card_type, "virtual");
    }

    #[test]
    fn test_card_form_rejects_expired() {
        let form = CardBalanceForm {
            ledger_id: "ldg_1".to_string(),
            identity_id: "idt_1".to_string(),
            currency: "USD".to_string(),
            expiry: "01/20".to_string(),
            ..Default::default()
        };
        let err = form.validate(jan(2026)).unwrap_err();
        assert_eq!(err.field_errors(), &[FieldError::new("expiry", "Card has expired")]);
    }

    #[test]
    fn test_identity_form_verification_meta() {
        let form = IdentityForm {
            identity_type: "individual".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email_address: "ada@example.com".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());
        let identity = form.to_identity(Utc::now());
        assert_eq!(identity.verification_status(), Some("pending"));
        assert_eq!(identity.category, "customer");

        let org = IdentityForm {
            identity_type: "organization".to_string(),
            email_address: "ops@acme.test".to_string(),
            ..Default::default()
        };
        let err = org.validate().unwrap_err();
        assert_eq!(err.field_errors()[0].field, "organization_name");
    }

    #[test]
    fn test_wallet_form_defaults() {
        let form = WalletForm {
            ledger_id: "ldg".to_string(),
            identity_id: "idt".to_string(),
            currency: "usd".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());
        let request = form.to_request();
        assert_eq!(request.meta_data.wallet_type.as_deref(), Some("personal"));
        assert_eq!(request.meta_data.purpose.as_deref(), Some("general"));
        assert_eq!(request.meta_data.status.as_deref(), Some("active"));
    }

    #[test]
    fn test_fund_card_form_single_message() {
        let err = FundCardForm::default().validate().unwrap_err();
        assert_eq!(err.field_errors().len(), 1);
    }
}
