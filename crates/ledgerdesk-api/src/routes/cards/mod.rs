//! Card balance routes - pages only; the API side goes through `/api/balances`

pub mod page;

pub use page::{page_card_create, page_card_detail, page_card_fund, page_card_store, page_cards};
