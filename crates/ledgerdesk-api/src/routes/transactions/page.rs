//! Transaction list page

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use ledgerdesk_core::Transaction;
use ledgerdesk_utils::escape_html;

use crate::routes::widgets::{display_date, page_header, status_badge, table};
use crate::{error_banner, fetch_list, page_response, AppState};

/// Table of transactions, newest first as the upstream returns them
pub fn transactions_table(transactions: &[Transaction], empty: &str) -> String {
    let rows: Vec<Vec<String>> = transactions
        .iter()
        .map(|t| {
            vec![
                format!("<code class='text-xs'>{}</code>", escape_html(&t.reference)),
                escape_html(t.transaction_type().unwrap_or("—")),
                t.display_amount(),
                format!(
                    "<span class='text-xs'>{} → {}</span>",
                    escape_html(&t.source),
                    escape_html(&t.destination)
                ),
                escape_html(&t.description),
                status_badge(&t.status),
                display_date(t.created_at.as_deref()),
            ]
        })
        .collect();
    table(
        &["Reference", "Type", "Amount", "Flow", "Description", "Status", "Created"],
        &rows,
        empty,
    )
}

pub async fn page_transactions(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let body = match fetch_list::<Transaction>(&state, "/transactions", "Error fetching transactions").await {
        Ok(transactions) => transactions_table(&transactions, "No transactions yet"),
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error fetching transactions: {}", e);
            error_banner(&e.to_string())
        }
    };

    let inner_content = format!("{}{}", page_header("Transactions", None), body);
    Html(page_response(&headers, "Transactions", "/transactions", &inner_content))
}
