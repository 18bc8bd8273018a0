//! Wallet pages - list, create form, detail with deposit and withdraw

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use ledgerdesk_core::forms::{AmountForm, WalletForm};
use ledgerdesk_core::{
    format_money, parse_amount_to_minor, transfers, Balance, FieldError, ReferenceKind, Transaction,
    TransactionRequest,
};
use ledgerdesk_utils::escape_html;
use serde_json::Value;

use crate::routes::balances::{load_balance_detail, load_owner_options, render_balance_overview, OwnerOptions};
use crate::routes::proxy::segment;
use crate::routes::transactions::transactions_table;
use crate::routes::widgets::{
    display_date, link, page_header, select_input, status_badge, submit_button, table, text_input,
};
use crate::{error_banner, fetch_list, notice_from_query, page_response, AppState, NoticeQuery};

const WALLET_TYPES: &[(&str, &str)] = &[
    ("personal", "Personal"),
    ("main", "Main"),
    ("savings", "Savings"),
    ("business", "Business"),
];

pub async fn page_wallets(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let body = match fetch_list::<Balance>(&state, "/balances", "Error fetching wallets").await {
        Ok(balances) => {
            let rows: Vec<Vec<String>> = balances
                .iter()
                .filter(|b| !b.is_card())
                .map(|b| {
                    vec![
                        link(&format!("/wallets/{}", segment(&b.balance_id)), &b.balance_id),
                        link(&format!("/identities/{}", segment(&b.identity_id)), &b.identity_id),
                        escape_html(b.meta_data.wallet_type.as_deref().unwrap_or("—")),
                        format_money(b.balance, &b.currency),
                        status_badge(b.status()),
                        display_date(b.created_at.as_deref()),
                    ]
                })
                .collect();
            table(
                &["Wallet", "Owner", "Type", "Balance", "Status", "Created"],
                &rows,
                "No wallets yet",
            )
        }
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error fetching wallets: {}", e);
            error_banner(&e.to_string())
        }
    };

    let inner_content = format!(
        "{}{}{}",
        notice_from_query(&query),
        page_header("Wallets", Some(("/wallets/create", "New wallet"))),
        body
    );
    Html(page_response(&headers, "Wallets", "/wallets", &inner_content))
}

fn wallet_form(form: &WalletForm, options: &OwnerOptions, errors: &[FieldError], banner: &str) -> String {
    let types: Vec<(String, String)> = WALLET_TYPES
        .iter()
        .map(|(value, label)| (value.to_string(), label.to_string()))
        .collect();
    let options_banner = options.error.as_deref().map(error_banner).unwrap_or_default();

    format!(
        r#"{}{}{}
        <form method='post' action='/wallets/create' class='bg-white rounded-xl shadow-sm p-6 max-w-xl'>
            {}{}{}{}{}
            <div class='flex gap-2'>{}<a href='/wallets' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancel</a></div>
        </form>"#,
        page_header("Create wallet", None),
        banner,
        options_banner,
        select_input("ledger_id", "Ledger", &options.ledgers, &form.ledger_id, errors),
        select_input("identity_id", "Owner", &options.identities, &form.identity_id, errors),
        text_input("currency", "Currency", &form.currency, errors, "maxlength='3'"),
        select_input("wallet_type", "Wallet type", &types, &form.wallet_type, errors),
        text_input("purpose", "Purpose", &form.purpose, errors, "placeholder='general'"),
        submit_button("Create wallet")
    )
}

pub async fn page_wallet_create(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let options = load_owner_options(&state).await;
    let form = WalletForm {
        currency: state.config.wallets.default_currency.clone(),
        wallet_type: "personal".to_string(),
        ledger_id: state.config.wallets.default_ledger_id.clone().unwrap_or_default(),
        ..Default::default()
    };
    let inner_content = wallet_form(&form, &options, &[], "");
    Html(page_response(&headers, "Create wallet", "/wallets", &inner_content))
}

pub async fn page_wallet_store(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<WalletForm>,
) -> Response {
    let (errors, message) = match form.validate() {
        Err(e) => (e.field_errors().to_vec(), e.to_string()),
        Ok(()) => {
            let created: Result<Balance, _> = state
                .upstream
                .post_json("/balances", &form.to_request(), "Error creating wallet")
                .await;
            match created {
                Ok(balance) => {
                    log::info!(target: "ledgerdesk::pages", "Created wallet {}", balance.balance_id);
                    return Redirect::to(&format!(
                        "/wallets/{}?notice={}",
                        segment(&balance.balance_id),
                        urlencoding::encode("Wallet created successfully")
                    ))
                    .into_response();
                }
                Err(e) => {
                    log::error!(target: "ledgerdesk::pages", "Error creating wallet: {}", e);
                    (Vec::new(), e.to_string())
                }
            }
        }
    };

    let options = load_owner_options(&state).await;
    let inner_content = wallet_form(&form, &options, &errors, &error_banner(&message));
    Html(page_response(&headers, "Create wallet", "/wallets", &inner_content)).into_response()
}

fn amount_form(id: &str, action: &str, title: &str, button: &str) -> String {
    format!(
        r#"<form method='post' action='/wallets/{}/{}' class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>{}</h3>
            {}{}{}
        </form>"#,
        segment(id),
        action,
        title,
        text_input("amount", "Amount", "", &[], "inputmode='decimal' placeholder='0.00' required"),
        text_input("description", "Description", "", &[], ""),
        submit_button(button)
    )
}

/// Detail page body; `banner` carries a notice or an error from the last action
async fn render_wallet_detail(state: &AppState, id: &str, banner: &str) -> String {
    let transactions_path = format!("/balances/{}/transactions", segment(id));
    let (detail, transactions) = tokio::join!(
        load_balance_detail(state, id),
        fetch_list::<Transaction>(state, &transactions_path, "Error fetching transactions"),
    );

    match detail {
        Ok(detail) => {
            let history = match transactions {
                Ok(transactions) => transactions_table(&transactions, "No transactions for this wallet"),
                Err(e) => {
                    log::warn!(target: "ledgerdesk::pages", "Transactions for {} unavailable: {}", id, e);
                    error_banner(&e.to_string())
                }
            };
            format!(
                r#"{}{}{}
                <div class='grid grid-cols-1 md:grid-cols-2 gap-6 mb-6'>{}{}</div>
                <h3 class='text-lg font-semibold mb-4'>Transactions</h3>{}"#,
                banner,
                page_header("Wallet", Some(("/wallets", "All wallets"))),
                render_balance_overview(&detail),
                amount_form(id, "deposit", "Deposit", "Deposit"),
                amount_form(id, "withdraw", "Withdraw", "Withdraw"),
                history
            )
        }
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error fetching wallet {}: {}", id, e);
            format!("{}{}", page_header("Wallet", None), error_banner(&e.to_string()))
        }
    }
}

pub async fn page_wallet_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<NoticeQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let inner_content = render_wallet_detail(&state, &id, &notice_from_query(&query)).await;
    Html(page_response(&headers, "Wallet", "/wallets", &inner_content))
}

/// Which way money moves relative to the wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Movement {
    Deposit,
    Withdrawal,
}

impl Movement {
    fn request(&self, wallet: &Balance, amount: i64, description: &str) -> TransactionRequest {
        let description = Some(description).filter(|d| !d.trim().is_empty());
        match self {
            Movement::Deposit => transfers::deposit(
                &wallet.balance_id,
                amount,
                &wallet.currency,
                ReferenceKind::Deposit.generate(),
                description,
            ),
            Movement::Withdrawal => transfers::withdrawal(
                &wallet.balance_id,
                amount,
                &wallet.currency,
                ReferenceKind::Withdrawal.generate(),
                description,
            ),
        }
    }

    fn success_notice(&self) -> &'static str {
        match self {
            Movement::Deposit => "Deposit successful",
            Movement::Withdrawal => "Withdrawal successful",
        }
    }
}

async fn move_money(state: &AppState, id: &str, movement: Movement, form: &AmountForm) -> Result<(), String> {
    let amount = parse_amount_to_minor(&form.amount).map_err(|e| e.to_string())?;
    let mut wallet: Balance = state
        .upstream
        .get_json(&format!("/balances/{}", segment(id)), "Error fetching wallet")
        .await
        .map_err(|e| e.to_string())?;
    if wallet.currency.is_empty() {
        wallet.currency = state.config.wallets.default_currency.clone();
    }

    let request = movement.request(&wallet, amount, &form.description);
    let posted: Value = state
        .upstream
        .post_json("/transactions", &request, "Error processing transaction")
        .await
        .map_err(|e| e.to_string())?;
    log::info!(
        target: "ledgerdesk::pages",
        "{:?} of {} on {} ({})",
        movement,
        amount,
        id,
        posted.get("transaction_id").and_then(Value::as_str).unwrap_or(&request.reference)
    );
    Ok(())
}

async fn handle_movement(
    state: AppState,
    id: String,
    headers: HeaderMap,
    movement: Movement,
    form: AmountForm,
) -> Response {
    match move_money(&state, &id, movement, &form).await {
        Ok(()) => Redirect::to(&format!(
            "/wallets/{}?notice={}",
            segment(&id),
            urlencoding::encode(movement.success_notice())
        ))
        .into_response(),
        Err(message) => {
            log::error!(target: "ledgerdesk::pages", "{:?} on {} failed: {}", movement, id, message);
            let inner_content = render_wallet_detail(&state, &id, &error_banner(&message)).await;
            Html(page_response(&headers, "Wallet", "/wallets", &inner_content)).into_response()
        }
    }
}

pub async fn page_wallet_deposit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<AmountForm>,
) -> Response {
    handle_movement(state, id, headers, Movement::Deposit, form).await
}

pub async fn page_wallet_withdraw(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<AmountForm>,
) -> Response {
    handle_movement(state, id, headers, Movement::Withdrawal, form).await
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn wallet() -> serde_json::Value {
        json!({
            "balance_id": "bln_1",
            "ledger_id": "ldg_1",
            "identity_id": "idt_1",
            "currency": "USD",
            "balance": 10000,
            "meta_data": {"wallet_type": "personal", "status": "active"}
        })
    }

    #[tokio::test]
    async fn test_list_hides_cards() {
        let (app, mock, _dir) = test_app().await;
        mock.reply(
            "GET",
            "/balances",
            200,
            json!([
                wallet(),
                {"balance_id": "bln_card", "currency": "USD", "meta_data": {"wallet_type": "card"}}
            ]),
        );

        let html = call(&app, "GET", "/wallets", None).await.text();
        assert!(html.contains("href='/wallets/bln_1'"));
        assert!(!html.contains("bln_card"));
        assert!(html.contains("100.00 USD"));
    }

    #[tokio::test]
    async fn test_create_form_lists_owners() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/ledgers", 200, json!([{"ledger_id": "ldg_1", "name": "General"}]))
            .reply(
                "GET",
                "/identities",
                200,
                json!([{"identity_id": "idt_1", "first_name": "Ada", "last_name": "Lovelace"}]),
            );

        let html = call(&app, "GET", "/wallets/create", None).await.text();
        assert!(html.contains("<option value='ldg_1'>General</option>"));
        assert!(html.contains("<option value='idt_1'>Ada Lovelace</option>"));
        assert!(html.contains("value='USD'"));
    }

    #[tokio::test]
    async fn test_store_validation_and_success() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/ledgers", 200, json!([]))
            .reply("GET", "/identities", 200, json!([]));

        let res = submit_form(&app, "/wallets/create", "currency=usd").await;
        assert_eq!(res.status, StatusCode::OK);
        let html = res.text();
        assert!(html.contains("Please select a ledger"));
        assert!(html.contains("Please select an identity"));

        mock.reply("POST", "/balances", 201, json!({"balance_id": "bln_new"}));
        let res = submit_form(&app, "/wallets/create", "ledger_id=ldg_1&identity_id=idt_1&currency=usd").await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        assert!(res.headers["location"].to_str().unwrap().starts_with("/wallets/bln_new?notice="));
        let sent = mock.last().body;
        assert_eq!(sent["currency"], "USD");
        assert_eq!(sent["meta_data"]["wallet_type"], "personal");
    }

    #[tokio::test]
    async fn test_detail_renders_forms_and_history() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/balances/bln_1", 200, wallet())
            .reply("GET", "/ledgers/ldg_1", 200, json!({"ledger_id": "ldg_1", "name": "General"}))
            .reply("GET", "/identities/idt_1", 200, json!({"identity_id": "idt_1", "first_name": "Ada"}))
            .reply(
                "GET",
                "/balances/bln_1/transactions",
                200,
                json!([{"reference": "WD-1", "amount": 5, "currency": "USD", "status": "APPLIED"}]),
            );

        let html = htmx_get(&app, "/wallets/bln_1").await.text();
        assert!(html.contains("action='/wallets/bln_1/deposit'"));
        assert!(html.contains("action='/wallets/bln_1/withdraw'"));
        assert!(html.contains("WD-1"));
        assert!(html.contains("5.00 USD"));
    }

    #[tokio::test]
    async fn test_deposit_posts_minor_units() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/balances/bln_1", 200, wallet())
            .reply("POST", "/transactions", 201, json!({"transaction_id": "txn_1"}));

        let res = submit_form(&app, "/wallets/bln_1/deposit", "amount=10.50&description=").await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        assert!(res.headers["location"].to_str().unwrap().contains("Deposit%20successful"));

        let sent = mock.last().body;
        assert_eq!(sent["amount"], 1050);
        assert_eq!(sent["precision"], 100);
        assert_eq!(sent["source"], "@WorldUSD");
        assert_eq!(sent["destination"], "bln_1");
        assert_eq!(sent["description"], "Deposit to wallet");
        assert!(sent["reference"].as_str().unwrap().starts_with("DEP-"));
    }

    #[tokio::test]
    async fn test_withdraw_rejects_bad_amount() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/balances/bln_1", 200, wallet())
            .reply("GET", "/balances/bln_1/transactions", 200, json!([]));

        let res = submit_form(&app, "/wallets/bln_1/withdraw", "amount=-3").await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.text().contains("Please enter a valid amount"));
        assert!(mock.calls().iter().all(|c| c.method == "GET"));
    }

    #[tokio::test]
    async fn test_deposit_rejects_overflowing_amount() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/balances/bln_1", 200, wallet())
            .reply("GET", "/balances/bln_1/transactions", 200, json!([]));

        let res = submit_form(&app, "/wallets/bln_1/deposit", "amount=79228162514264337593543950335").await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.text().contains("Please enter a valid amount"));
        assert!(mock.calls().iter().all(|c| c.method == "GET"));
    }

    #[tokio::test]
    async fn test_withdraw_shape() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/balances/bln_1", 200, wallet())
            .reply("POST", "/transactions", 201, json!({"transaction_id": "txn_2"}));

        submit_form(&app, "/wallets/bln_1/withdraw", "amount=2&description=ATM").await;
        let sent = mock.last().body;
        assert_eq!(sent["source"], "bln_1");
        assert_eq!(sent["destination"], "@WorldUSD");
        assert_eq!(sent["allow_overdraft"], false);
        assert_eq!(sent["description"], "ATM");
        assert!(sent["reference"].as_str().unwrap().starts_with("WD-"));
    }
}
