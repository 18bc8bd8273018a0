//! Transaction routes - proxy, deposit/transfer shortcuts and the list page
//!
//! Structure:
//! - api.rs: `/api/transactions` proxy with the hold/commit/void lifecycle
//! - page.rs: Transaction list and the table shared with wallet pages

pub mod api;
pub mod page;

pub use api::{
    api_deposit, api_transaction_delete, api_transaction_detail, api_transaction_post,
    api_transaction_update, api_transactions, api_transfer, DepositBody, TransactionQuery,
    TransferBody,
};
pub use page::{page_transactions, transactions_table};
