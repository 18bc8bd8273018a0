//! Balance routes - proxy and shared balance detail rendering
//!
//! Wallet and card pages both build on `page::load_balance_detail`.

pub mod api;
pub mod page;

pub use api::{api_balance_create, api_balance_detail, api_balances, BalanceQuery};
pub use page::{
    load_balance_detail, load_owner_options, render_balance_overview, BalanceDetail, OwnerOptions,
};
