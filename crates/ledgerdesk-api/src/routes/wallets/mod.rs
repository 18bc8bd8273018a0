//! Wallet routes - creation shortcut and wallet pages
//!
//! Structure:
//! - api.rs: `/api/wallets/create`
//! - page.rs: List, create form, detail with deposit and withdraw

pub mod api;
pub mod page;

pub use api::{api_wallet_create, CreateWalletBody};
pub use page::{
    page_wallet_create, page_wallet_deposit, page_wallet_detail, page_wallet_store,
    page_wallet_withdraw, page_wallets,
};
