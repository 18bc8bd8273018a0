//! Identity routes - proxy and pages
//!
//! Structure:
//! - api.rs: `/api/identities` proxy and the simplified create endpoint
//! - page.rs: List, detail and create pages

pub mod api;
pub mod page;

pub use api::{
    api_identities, api_identity_create, api_identity_create_from_form, api_identity_delete,
    api_identity_detail, api_identity_update, CreateIdentityBody,
};
pub use page::{page_identities, page_identity_create, page_identity_detail, page_identity_store};
