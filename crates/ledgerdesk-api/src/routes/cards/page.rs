//! Card balance pages - list, create form, detail with fund-card

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Utc;
use ledgerdesk_core::forms::{CardBalanceForm, FundCardForm};
use ledgerdesk_core::{
    format_money, parse_amount_to_minor, transfers, Balance, CoreError, FieldError, ReferenceKind,
};
use ledgerdesk_utils::escape_html;
use serde_json::Value;

use crate::routes::balances::{load_balance_detail, load_owner_options, render_balance_overview, OwnerOptions};
use crate::routes::proxy::segment;
use crate::routes::widgets::{
    display_date, link, page_header, select_input, status_badge, submit_button, table, text_input,
};
use crate::{error_banner, fetch_list, notice_from_query, page_response, AppState, NoticeQuery};

const CARD_TYPES: &[(&str, &str)] = &[("virtual", "Virtual"), ("physical", "Physical")];

/// Card balances link to their card page, everything else to the wallet page
fn balance_href(balance: &Balance) -> String {
    let base = if balance.is_card() { "/cards" } else { "/wallets" };
    format!("{}/{}", base, segment(&balance.balance_id))
}

pub async fn page_cards(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let body = match fetch_list::<Balance>(&state, "/balances", "Error fetching balances").await {
        Ok(balances) => {
            let rows: Vec<Vec<String>> = balances
                .iter()
                .map(|b| {
                    let card = b
                        .meta_data
                        .card_details
                        .as_ref()
                        .map(|c| format!("{} · {}", escape_html(&c.masked_number), escape_html(&c.expiry)))
                        .unwrap_or_else(|| "—".to_string());
                    vec![
                        link(&balance_href(b), &b.balance_id),
                        card,
                        escape_html(b.meta_data.purpose.as_deref().unwrap_or("—")),
                        format_money(b.balance, &b.currency),
                        status_badge(b.status()),
                        display_date(b.created_at.as_deref()),
                    ]
                })
                .collect();
            table(
                &["Balance", "Card", "Purpose", "Balance", "Status", "Created"],
                &rows,
                "No balances yet",
            )
        }
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error fetching balances: {}", e);
            error_banner(&e.to_string())
        }
    };

    let inner_content = format!(
        "{}{}{}",
        notice_from_query(&query),
        page_header("Card balances", Some(("/cards/create", "New card balance"))),
        body
    );
    Html(page_response(&headers, "Card balances", "/cards", &inner_content))
}

fn card_form(form: &CardBalanceForm, options: &OwnerOptions, errors: &[FieldError], banner: &str) -> String {
    let types: Vec<(String, String)> = CARD_TYPES
        .iter()
        .map(|(value, label)| (value.to_string(), label.to_string()))
        .collect();
    let options_banner = options.error.as_deref().map(error_banner).unwrap_or_default();

    format!(
        r#"{}{}{}
        <form method='post' action='/cards/create' class='bg-white rounded-xl shadow-sm p-6 max-w-xl'>
            {}{}{}{}{}{}
            <div class='flex gap-2'>{}<a href='/cards' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancel</a></div>
        </form>"#,
        page_header("Create card balance", None),
        banner,
        options_banner,
        select_input("ledger_id", "Ledger", &options.ledgers, &form.ledger_id, errors),
        select_input("identity_id", "Card holder", &options.identities, &form.identity_id, errors),
        text_input("currency", "Currency", &form.currency, errors, "maxlength='3'"),
        text_input("masked_number", "Masked card number", &form.masked_number, errors, "placeholder='**** **** **** 4242'"),
        text_input("expiry", "Expiry (MM/YY)", &form.expiry(), errors, "placeholder='MM/YY' maxlength='5'"),
        select_input("card_type", "Card type", &types, &form.card_type, errors),
        submit_button("Create card balance")
    )
}

pub async fn page_card_create(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let options = load_owner_options(&state).await;
    let form = CardBalanceForm {
        currency: state.config.wallets.default_currency.clone(),
        card_type: "virtual".to_string(),
        ..Default::default()
    };
    let inner_content = card_form(&form, &options, &[], "");
    Html(page_response(&headers, "Create card balance", "/cards", &inner_content))
}

pub async fn page_card_store(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CardBalanceForm>,
) -> Response {
    let (errors, message) = match form.validate(Utc::now().date_naive()) {
        Err(e) => (e.field_errors().to_vec(), e.to_string()),
        Ok(()) => {
            let created: Result<Balance, _> = state
                .upstream
                .post_json("/balances", &form.to_request(), "Error creating card balance")
                .await;
            match created {
                Ok(balance) => {
                    log::info!(target: "ledgerdesk::pages", "Created card balance {}", balance.balance_id);
                    return Redirect::to(&format!(
                        "/cards/{}?notice={}",
                        segment(&balance.balance_id),
                        urlencoding::encode("Card balance created successfully")
                    ))
                    .into_response();
                }
                Err(e) => {
                    log::error!(target: "ledgerdesk::pages", "Error creating card balance: {}", e);
                    (Vec::new(), e.to_string())
                }
            }
        }
    };

    let options = load_owner_options(&state).await;
    let inner_content = card_form(&form, &options, &errors, &error_banner(&message));
    Html(page_response(&headers, "Create card balance", "/cards", &inner_content)).into_response()
}

/// Non-card balances that can fund `card_id`, as select options
fn source_wallet_options(balances: &[Balance], card_id: &str) -> Vec<(String, String)> {
    balances
        .iter()
        .filter(|b| !b.is_card() && b.balance_id != card_id)
        .map(|b| {
            (
                b.balance_id.clone(),
                format!("{} ({})", b.balance_id, format_money(b.balance, &b.currency)),
            )
        })
        .collect()
}

async fn render_card_detail(state: &AppState, id: &str, banner: &str, form: &FundCardForm) -> String {
    let (detail, balances) = tokio::join!(
        load_balance_detail(state, id),
        fetch_list::<Balance>(state, "/balances", "Error fetching wallets"),
    );

    match detail {
        Ok(detail) => {
            let fund_form = match balances {
                Ok(balances) => {
                    let wallets = source_wallet_options(&balances, id);
                    format!(
                        r#"<form method='post' action='/cards/{}/fund' class='bg-white rounded-xl shadow-sm p-6 max-w-xl'>
                            <h3 class='text-lg font-semibold mb-4'>Fund card</h3>
                            {}{}{}
                        </form>"#,
                        segment(id),
                        select_input("source_wallet", "Source wallet", &wallets, &form.source_wallet, &[]),
                        text_input("amount", "Amount", &form.amount, &[], "inputmode='decimal' placeholder='0.00'"),
                        submit_button("Fund card")
                    )
                }
                Err(e) => {
                    log::warn!(target: "ledgerdesk::pages", "Source wallets for {} unavailable: {}", id, e);
                    error_banner(&e.to_string())
                }
            };
            format!(
                "{}{}{}{}",
                banner,
                page_header("Card balance", Some(("/cards", "All card balances"))),
                render_balance_overview(&detail),
                fund_form
            )
        }
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error fetching card balance {}: {}", id, e);
            format!("{}{}", page_header("Card balance", None), error_banner(&e.to_string()))
        }
    }
}

pub async fn page_card_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<NoticeQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let inner_content =
        render_card_detail(&state, &id, &notice_from_query(&query), &FundCardForm::default()).await;
    Html(page_response(&headers, "Card balance", "/cards", &inner_content))
}

#[derive(Debug, thiserror::Error)]
enum FundError {
    #[error("{0}")]
    Invalid(CoreError),
    #[error("{0}")]
    Upstream(String),
}

/// Move `form.amount` from the chosen wallet into the card balance
async fn fund(state: &AppState, card_id: &str, form: &FundCardForm) -> Result<String, FundError> {
    form.validate().map_err(FundError::Invalid)?;
    let amount = parse_amount_to_minor(&form.amount).map_err(FundError::Invalid)?;

    let card_path = format!("/balances/{}", segment(card_id));
    let source_path = format!("/balances/{}", segment(form.source_wallet.trim()));
    let (card, source) = tokio::join!(
        state.upstream.get_json::<Balance>(&card_path, "Error fetching card balance"),
        state.upstream.get_json::<Balance>(&source_path, "Error fetching source wallet"),
    );
    let card = card.map_err(|e| FundError::Upstream(e.to_string()))?;
    let source = source.map_err(|e| FundError::Upstream(e.to_string()))?;

    transfers::ensure_sufficient(&source, amount).map_err(FundError::Invalid)?;

    let request = transfers::fund_card(&source.balance_id, &card, amount, ReferenceKind::Transfer.generate());
    let posted: Value = state
        .upstream
        .post_json("/transactions", &request, "Error funding card")
        .await
        .map_err(|e| FundError::Upstream(e.to_string()))?;
    Ok(posted
        .get("transaction_id")
        .and_then(Value::as_str)
        .unwrap_or(&request.reference)
        .to_string())
}

pub async fn page_card_fund(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<FundCardForm>,
) -> Response {
    match fund(&state, &id, &form).await {
        Ok(transaction) => {
            log::info!(target: "ledgerdesk::pages", "Funded card {} ({})", id, transaction);
            Redirect::to(&format!(
                "/cards/{}?notice={}",
                segment(&id),
                urlencoding::encode("Card funded successfully")
            ))
            .into_response()
        }
        Err(e) => {
            match &e {
                FundError::Invalid(_) => log::warn!(target: "ledgerdesk::pages", "Rejected funding of {}: {}", id, e),
                FundError::Upstream(_) => log::error!(target: "ledgerdesk::pages", "Funding of {} failed: {}", id, e),
            }
            let inner_content = render_card_detail(&state, &id, &error_banner(&e.to_string()), &form).await;
            Html(page_response(&headers, "Card balance", "/cards", &inner_content)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn card() -> Value {
        json!({
            "balance_id": "bln_card",
            "identity_id": "idt_1",
            "currency": "USD",
            "balance": 0,
            "meta_data": {
                "wallet_type": "card",
                "status": "active",
                "card_details": {"masked_number": "**** 4242", "expiry": "01/29", "type": "virtual"}
            }
        })
    }

    fn wallet(balance: i64) -> Value {
        json!({"balance_id": "bln_w", "currency": "USD", "balance": balance, "meta_data": {"wallet_type": "personal"}})
    }

    #[test]
    fn test_source_wallets_exclude_cards() {
        let balances: Vec<Balance> = serde_json::from_value(json!([card(), wallet(500)])).unwrap();
        let options = source_wallet_options(&balances, "bln_card");
        assert_eq!(options, vec![("bln_w".to_string(), "bln_w (5.00 USD)".to_string())]);
    }

    #[tokio::test]
    async fn test_list_shows_all_balances() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/balances", 200, json!([card(), wallet(500)]));

        let html = call(&app, "GET", "/cards", None).await.text();
        assert!(html.contains("href='/cards/bln_card'"));
        assert!(html.contains("href='/wallets/bln_w'"));
        assert!(html.contains("**** 4242"));
    }

    #[tokio::test]
    async fn test_store_rejects_expired_card() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/ledgers", 200, json!([]))
            .reply("GET", "/identities", 200, json!([]));

        let res = submit_form(
            &app,
            "/cards/create",
            "ledger_id=ldg_1&identity_id=idt_1&currency=USD&masked_number=4242&expiry=01%2F20",
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.text().contains("Card has expired"));
        assert!(mock.calls().iter().all(|c| c.method == "GET"));
    }

    #[tokio::test]
    async fn test_store_creates_card_balance() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("POST", "/balances", 201, json!({"balance_id": "bln_card"}));

        let res = submit_form(
            &app,
            "/cards/create",
            "ledger_id=ldg_1&identity_id=idt_1&currency=usd&masked_number=4242&expiry=1299&card_type=",
        )
        .await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        assert!(res.headers["location"].to_str().unwrap().starts_with("/cards/bln_card?notice="));

        let sent = mock.last().body;
        assert_eq!(sent["meta_data"]["wallet_type"], "card");
        assert_eq!(sent["meta_data"]["purpose"], "card_payments");
        assert_eq!(sent["meta_data"]["card_details"]["expiry"], "12/99");
        assert_eq!(sent["meta_data"]["card_details"]["type"], "virtual");
    }

    #[tokio::test]
    async fn test_fund_rejects_insufficient_balance() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/balances/bln_card", 200, card())
            .reply("GET", "/balances/bln_w", 200, wallet(500))
            .reply("GET", "/balances", 200, json!([card(), wallet(500)]));

        let res = submit_form(&app, "/cards/bln_card/fund", "source_wallet=bln_w&amount=10.50").await;
        assert_eq!(res.status, StatusCode::OK);
        let html = res.text();
        assert!(html.contains("Insufficient balance in source wallet"));
        assert!(html.contains("<option value='bln_w' selected>"));
        assert!(mock.calls().iter().all(|c| c.method == "GET"));
    }

    #[tokio::test]
    async fn test_fund_requires_wallet_and_amount() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/balances/bln_card", 200, card())
            .reply("GET", "/balances", 200, json!([card()]));

        let res = submit_form(&app, "/cards/bln_card/fund", "source_wallet=&amount=").await;
        assert!(res.text().contains("Please select a wallet and enter an amount"));
    }

    #[tokio::test]
    async fn test_fund_posts_transfer() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/balances/bln_card", 200, card())
            .reply("GET", "/balances/bln_w", 200, wallet(5000))
            .reply("POST", "/transactions", 201, json!({"transaction_id": "txn_f"}));

        let res = submit_form(&app, "/cards/bln_card/fund", "source_wallet=bln_w&amount=10.50").await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);

        let sent = mock.last().body;
        assert_eq!(sent["amount"], 1050);
        assert_eq!(sent["precision"], 100);
        assert_eq!(sent["source"], "bln_w");
        assert_eq!(sent["destination"], "bln_card");
        assert_eq!(sent["meta_data"]["purpose"], "fund_card");
        let reference = sent["reference"].as_str().unwrap();
        assert!(reference.starts_with("TRF-"));
        assert_eq!(reference.len(), "TRF-".len() + 14);
        assert!(reference[4..].chars().all(|c| c.is_ascii_digit()));
    }
}
