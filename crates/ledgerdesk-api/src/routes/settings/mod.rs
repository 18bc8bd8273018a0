//! Settings routes - effective configuration with secrets redacted
//!
//! Structure:
//! - api.rs: `/api/settings`
//! - page.rs: Settings page

pub mod api;
pub mod page;

pub use api::api_settings;
pub use page::page_settings;
