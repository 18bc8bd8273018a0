//! Customer routes - `/api/customers/:id` proxy

pub mod api;

pub use api::{api_customer_delete, api_customer_detail, api_customer_update};
