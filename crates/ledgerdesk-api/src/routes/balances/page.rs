//! Balance detail loading and rendering shared by wallet and card pages

use ledgerdesk_client::ClientError;
use ledgerdesk_core::{format_money, Balance, Identity, Ledger};
use ledgerdesk_utils::escape_html;

use crate::routes::proxy::segment;
use crate::routes::widgets::{detail_row, display_date, link, status_badge};
use crate::AppState;

/// A balance with whatever could be resolved of its ledger and owner
#[derive(Debug, Clone)]
pub struct BalanceDetail {
    pub balance: Balance,
    pub ledger: Option<Ledger>,
    pub identity: Option<Identity>,
}

/// Fetch the balance, then its ledger and identity in parallel.
///
/// Only the balance itself is required; a failed nested lookup leaves the
/// corresponding field `None`.
pub async fn load_balance_detail(state: &AppState, balance_id: &str) -> Result<BalanceDetail, ClientError> {
    let balance: Balance = state
        .upstream
        .get_json(&format!("/balances/{}", segment(balance_id)), "Error fetching balance")
        .await?;

    let ledger_path = format!("/ledgers/{}", segment(&balance.ledger_id));
    let identity_path = format!("/identities/{}", segment(&balance.identity_id));
    let (ledger, identity) = tokio::join!(
        state.upstream.get_json::<Ledger>(&ledger_path, "Error fetching ledger"),
        state.upstream.get_json::<Identity>(&identity_path, "Error fetching identity"),
    );

    let ledger = ledger
        .map_err(|e| log::warn!(target: "ledgerdesk::pages", "Ledger lookup for {} failed: {}", balance_id, e))
        .ok();
    let identity = identity
        .map_err(|e| log::warn!(target: "ledgerdesk::pages", "Identity lookup for {} failed: {}", balance_id, e))
        .ok();

    Ok(BalanceDetail {
        balance,
        ledger,
        identity,
    })
}

/// Select options for the ledger and owner pickers of the balance create forms
#[derive(Debug, Clone, Default)]
pub struct OwnerOptions {
    pub ledgers: Vec<(String, String)>,
    pub identities: Vec<(String, String)>,
    /// Set when either list could not be loaded
    pub error: Option<String>,
}

pub async fn load_owner_options(state: &AppState) -> OwnerOptions {
    let (ledgers, identities) = tokio::join!(
        crate::fetch_list::<Ledger>(state, "/ledgers", "Error fetching ledgers"),
        crate::fetch_list::<Identity>(state, "/identities", "Error fetching identities"),
    );

    let mut options = OwnerOptions::default();
    match ledgers {
        Ok(ledgers) => {
            options.ledgers = ledgers
                .into_iter()
                .map(|l| {
                    let label = if l.name.is_empty() { l.ledger_id.clone() } else { l.name.clone() };
                    (l.ledger_id, label)
                })
                .collect()
        }
        Err(e) => options.error = Some(e.to_string()),
    }
    match identities {
        Ok(identities) => {
            options.identities = identities
                .into_iter()
                .map(|i| (i.identity_id.clone(), i.display_name()))
                .collect()
        }
        Err(e) => options.error = Some(e.to_string()),
    }
    options
}

fn amount_card(label: &str, minor: i64, currency: &str, color: &str) -> String {
    format!(
        "<div class='bg-{color}-50 p-4 rounded-lg border border-{color}-200'><p class='text-sm text-{color}-600'>{label}</p><p class='text-xl font-bold text-{color}-700'>{}</p></div>",
        format_money(minor, currency)
    )
}

/// Amount tiles plus the ledger/owner/status facts of a balance
pub fn render_balance_overview(detail: &BalanceDetail) -> String {
    let b = &detail.balance;
    let ledger = detail
        .ledger
        .as_ref()
        .map(|l| link(&format!("/ledgers/{}", segment(&l.ledger_id)), &l.name))
        .unwrap_or_else(|| "—".to_string());
    let owner = detail
        .identity
        .as_ref()
        .map(|i| link(&format!("/identities/{}", segment(&i.identity_id)), &i.display_name()))
        .unwrap_or_else(|| "—".to_string());

    let mut facts = vec![
        format!("<div><p class='text-sm text-gray-500'>Ledger</p><p class='font-medium'>{}</p></div>", ledger),
        format!("<div><p class='text-sm text-gray-500'>Owner</p><p class='font-medium'>{}</p></div>", owner),
        detail_row("Currency", &b.currency),
        format!("<div><p class='text-sm text-gray-500'>Status</p><p>{}</p></div>", status_badge(b.status())),
        detail_row("Created", &display_date(b.created_at.as_deref())),
    ];
    if let Some(purpose) = &b.meta_data.purpose {
        facts.push(detail_row("Purpose", purpose));
    }
    if b.has_inflight_expiry() {
        facts.push(detail_row("Inflight expires", &display_date(b.inflight_expires_at.as_deref())));
    }
    if let Some(card) = &b.meta_data.card_details {
        facts.push(detail_row("Card", &card.masked_number));
        facts.push(detail_row("Expiry", &card.expiry));
        facts.push(detail_row("Card type", &card.card_type));
    }

    format!(
        r#"<div class='grid grid-cols-2 lg:grid-cols-4 gap-4 mb-6'>{}{}{}{}</div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <p class='text-xs text-gray-400 mb-3'>{}</p>
            <div class='grid grid-cols-2 lg:grid-cols-3 gap-4'>{}</div>
        </div>"#,
        amount_card("Balance", b.balance, &b.currency, "indigo"),
        amount_card("Credits", b.credit_balance, &b.currency, "green"),
        amount_card("Debits", b.debit_balance, &b.currency, "red"),
        amount_card("Inflight", b.inflight_balance, &b.currency, "yellow"),
        escape_html(&b.balance_id),
        facts.join("")
    )
}
