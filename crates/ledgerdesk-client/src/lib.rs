//! HTTP clients for ledgerdesk
//!
//! `UpstreamClient` talks to the ledger service with the configured auth
//! scheme. `ProxyClient` talks to a running ledgerdesk server's `/api` routes.

pub mod error;
pub mod services;
pub mod upstream;

pub use error::{extract_message, ClientError};
pub use reqwest::Method;
pub use services::{BalanceService, LedgerService, ProxyClient, TransactionService};
pub use upstream::{UpstreamClient, UpstreamResponse};
