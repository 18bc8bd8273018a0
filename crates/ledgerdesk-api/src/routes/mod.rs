//! Route modules for the API server
//!
//! Each resource module follows the same structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON proxy endpoints under `/api`
//! - page.rs: HTMX page rendering
//!
//! `proxy` holds the shared upstream relay helpers and `widgets` the
//! HTML building blocks used by the pages.

pub mod balances;
pub mod cards;
pub mod customers;
pub mod identities;
pub mod ledgers;
pub mod proxy;
pub mod settings;
pub mod store;
pub mod transactions;
pub mod wallets;
pub mod widgets;
