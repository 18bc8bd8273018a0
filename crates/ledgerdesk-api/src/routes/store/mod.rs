//! Local persistence routes - `/api/store`

pub mod api;

pub use api::{api_store_delete, api_store_get, api_store_put};
