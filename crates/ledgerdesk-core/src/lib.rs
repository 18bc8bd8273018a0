//! Core ledger domain for ledgerdesk
//!
//! - models: mirrors of upstream identities, ledgers, balances, transactions
//! - forms: form inputs, field validation, card expiry checks
//! - money: major/minor unit conversion and display
//! - reference: client-generated transaction references
//! - transfers: deposit/withdrawal/transfer/fund-card request builders
//! - store: guarded local persistence of one JSON blob

pub mod error;
pub mod forms;
pub mod models;
pub mod money;
pub mod reference;
pub mod store;
pub mod transfers;
pub mod types;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity, FieldError};
pub use models::{
    ApiKeyRequest, Balance, BalanceMeta, BalanceRequest, CardDetails, Identity, Ledger,
    LedgerMeta, LedgerRequest, Transaction, TransactionMeta, TransactionRequest,
    DEFAULT_API_KEY_SCOPES, PRECISION, WORLD_ACCOUNT,
};
pub use money::{format_minor, format_money, parse_amount_to_minor};
pub use reference::ReferenceKind;
pub use store::LocalStore;
pub use types::{IdentityType, TransactionAction, TransactionType};
