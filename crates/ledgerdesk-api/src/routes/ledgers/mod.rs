//! Ledger routes - proxy and pages
//!
//! Structure:
//! - api.rs: `/api/ledgers` proxy
//! - page.rs: List, detail and create pages

pub mod api;
pub mod page;

pub use api::{
    api_ledger_create, api_ledger_delete, api_ledger_detail, api_ledger_update, api_ledgers,
    LedgerQuery,
};
pub use page::{page_ledger_create, page_ledger_detail, page_ledger_store, page_ledgers};
