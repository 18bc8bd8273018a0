//! Ledger pages - list, detail and create form

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use ledgerdesk_core::forms::LedgerForm;
use ledgerdesk_core::{format_money, Balance, FieldError, Ledger};
use ledgerdesk_utils::escape_html;
use serde_json::json;

use crate::routes::proxy::segment;
use crate::routes::widgets::{
    detail_row, display_date, link, page_header, status_badge, submit_button, table, text_input,
    textarea_input,
};
use crate::{error_banner, fetch_list, notice_from_query, page_response, AppState, NoticeQuery};

/// Key under which the most recently created ledger is remembered
pub const LAST_LEDGER_KEY: &str = "last_ledger_id";

pub async fn page_ledgers(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let body = match fetch_list::<Ledger>(&state, "/ledgers", "Error fetching ledgers").await {
        Ok(ledgers) => {
            let rows: Vec<Vec<String>> = ledgers
                .iter()
                .map(|l| {
                    vec![
                        link(&format!("/ledgers/{}", segment(&l.ledger_id)), &l.name),
                        format!("<code class='text-xs'>{}</code>", escape_html(&l.ledger_id)),
                        escape_html(l.meta_data.project_owner.as_deref().unwrap_or("—")),
                        display_date(l.created_at.as_deref()),
                    ]
                })
                .collect();
            table(&["Name", "Ledger ID", "Owner", "Created"], &rows, "No ledgers yet")
        }
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error fetching ledgers: {}", e);
            error_banner(&e.to_string())
        }
    };

    let inner_content = format!(
        "{}{}{}",
        notice_from_query(&query),
        page_header("Ledgers", Some(("/ledgers/create", "New ledger"))),
        body
    );
    Html(page_response(&headers, "Ledgers", "/ledgers", &inner_content))
}

pub async fn page_ledger_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Html<String> {
    let ledger_path = format!("/ledgers/{}", segment(&id));
    let balances_path = format!("/ledgers/{}/balances", segment(&id));
    let (ledger, balances) = tokio::join!(
        state.upstream.get_json::<Ledger>(&ledger_path, "Error fetching ledger details"),
        fetch_list::<Balance>(&state, &balances_path, "Error fetching balances"),
    );

    let inner_content = match ledger {
        Ok(ledger) => {
            let (count, balances_html) = match balances {
                Ok(balances) => {
                    let rows: Vec<Vec<String>> = balances
                        .iter()
                        .map(|b| {
                            let href = if b.is_card() { "/cards" } else { "/wallets" };
                            vec![
                                link(&format!("{}/{}", href, segment(&b.balance_id)), &b.balance_id),
                                escape_html(&b.currency),
                                format_money(b.balance, &b.currency),
                                status_badge(b.status()),
                            ]
                        })
                        .collect();
                    (
                        balances.len().to_string(),
                        table(&["Balance", "Currency", "Amount", "Status"], &rows, "No balances in this ledger"),
                    )
                }
                Err(e) => ("—".to_string(), error_banner(&e.to_string())),
            };
            format!(
                r#"{}
                <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
                    <div class='grid grid-cols-2 gap-4'>{}{}{}{}</div>
                    <p class='text-sm text-gray-500 mt-4'>Description</p><p>{}</p>
                </div>
                <h3 class='text-lg font-semibold mb-4'>Balances</h3>{}"#,
                page_header(&ledger.name, None),
                detail_row("Ledger ID", &ledger.ledger_id),
                detail_row("Owner", ledger.meta_data.project_owner.as_deref().unwrap_or("—")),
                detail_row("Created", &display_date(ledger.created_at.as_deref())),
                detail_row("Balances", &count),
                escape_html(ledger.meta_data.description.as_deref().unwrap_or("—")),
                balances_html
            )
        }
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error fetching ledger {}: {}", id, e);
            format!("{}{}", page_header("Ledger", None), error_banner(&e.to_string()))
        }
    };

    Html(page_response(&headers, "Ledger", "/ledgers", &inner_content))
}

fn ledger_form(form: &LedgerForm, errors: &[FieldError], banner: &str, last_ledger: Option<&str>) -> String {
    let last = last_ledger
        .map(|id| {
            format!(
                "<p class='text-sm text-gray-500 mb-4'>Last created ledger: {}</p>",
                link(&format!("/ledgers/{}", segment(id)), id)
            )
        })
        .unwrap_or_default();
    format!(
        r#"{}{}{}
        <form method='post' action='/ledgers/create' class='bg-white rounded-xl shadow-sm p-6 max-w-xl'>
            {}{}{}
            <div class='flex gap-2'>{}<a href='/ledgers' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancel</a></div>
        </form>"#,
        page_header("Create ledger", None),
        banner,
        last,
        text_input("name", "Ledger name", &form.name, errors, "required"),
        text_input("project_owner", "Project owner", &form.project_owner, errors, "required"),
        textarea_input("description", "Description", &form.description, errors),
        submit_button("Create ledger")
    )
}

pub async fn page_ledger_create(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let last = state.store.get_str(LAST_LEDGER_KEY).await;
    let inner_content = ledger_form(&LedgerForm::default(), &[], "", last.as_deref());
    Html(page_response(&headers, "Create ledger", "/ledgers", &inner_content))
}

/// Validate, create upstream, remember the id, then redirect to the list
pub async fn page_ledger_store(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LedgerForm>,
) -> Response {
    let rerender = |errors: &[FieldError], banner: String| {
        let inner_content = ledger_form(&form, errors, &banner, None);
        Html(page_response(&headers, "Create ledger", "/ledgers", &inner_content)).into_response()
    };

    if let Err(e) = form.validate() {
        return rerender(e.field_errors(), error_banner(&e.to_string()));
    }

    let created: Result<Ledger, _> = state
        .upstream
        .post_json("/ledgers", &form.to_request(), "Error creating ledger")
        .await;
    match created {
        Ok(ledger) => {
            log::info!(target: "ledgerdesk::pages", "Created ledger {}", ledger.ledger_id);
            state.store.set(LAST_LEDGER_KEY, json!(ledger.ledger_id)).await;
            let notice = format!("Ledger \"{}\" created successfully", ledger.name);
            Redirect::to(&format!("/ledgers?notice={}", urlencoding::encode(&notice))).into_response()
        }
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error creating ledger: {}", e);
            rerender(&[], error_banner(&e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_list_shows_notice_and_rows() {
        let (app, mock, _dir) = test_app().await;
        mock.reply(
            "GET",
            "/ledgers",
            200,
            json!([{"ledger_id": "ldg_1", "name": "General", "meta_data": {"project_owner": "Ops"}}]),
        );

        let res = call(&app, "GET", "/ledgers?notice=Saved", None).await;
        assert_eq!(res.status, StatusCode::OK);
        let html = res.text();
        assert!(html.contains("Saved"));
        assert!(html.contains("href='/ledgers/ldg_1'"));
        assert!(html.contains("Ops"));
    }

    #[tokio::test]
    async fn test_create_validation_errors() {
        let (app, mock, _dir) = test_app().await;
        let res = submit_form(&app, "/ledgers/create", "name=A&project_owner=B&description=short").await;
        assert_eq!(res.status, StatusCode::OK);
        let html = res.text();
        assert!(html.contains("Ledger name must be at least 2 characters."));
        assert!(html.contains("value='A'"));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_success_remembers_ledger() {
        let (app, mock, dir) = test_app().await;
        mock.reply("POST", "/ledgers", 201, json!({"ledger_id": "ldg_9", "name": "Payments"}));

        let res = submit_form(
            &app,
            "/ledgers/create",
            "name=Payments&project_owner=Finance+team&description=Customer+payment+flows",
        )
        .await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        let location = res.headers["location"].to_str().unwrap();
        assert!(location.starts_with("/ledgers?notice="));

        let sent = mock.last();
        assert_eq!(sent.body["name"], "Payments");
        assert_eq!(sent.body["meta_data"]["project_owner"], "Finance team");

        let store = ledgerdesk_core::LocalStore::new(dir.path());
        assert_eq!(store.get_str(LAST_LEDGER_KEY).await.as_deref(), Some("ldg_9"));

        let res = call(&app, "GET", "/ledgers/create", None).await;
        assert!(res.text().contains("Last created ledger"));
    }

    #[tokio::test]
    async fn test_create_upstream_failure_rerenders() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("POST", "/ledgers", 409, json!({"error": "ledger exists"}));
        let res = submit_form(
            &app,
            "/ledgers/create",
            "name=Payments&project_owner=Finance&description=Customer+payment+flows",
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.text().contains("ledger exists"));
    }

    #[tokio::test]
    async fn test_detail_with_balances() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/ledgers/ldg_1", 200, json!({"ledger_id": "ldg_1", "name": "General"}))
            .reply(
                "GET",
                "/ledgers/ldg_1/balances",
                200,
                json!([{"balance_id": "bln_1", "currency": "USD", "balance": 123456}]),
            );
        let html = htmx_get(&app, "/ledgers/ldg_1").await.text();
        assert!(html.contains("General"));
        assert!(html.contains("1,234.56"));
        assert!(html.contains("href='/wallets/bln_1'"));
    }
}
