//! Identity pages - list, detail and create form

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Utc;
use ledgerdesk_core::forms::IdentityForm;
use ledgerdesk_core::{FieldError, Identity, IdentityType};
use ledgerdesk_utils::escape_html;

use crate::routes::proxy::segment;
use crate::routes::widgets::{
    detail_row, display_date, link, page_header, select_input, status_badge, submit_button, table,
    text_input,
};
use crate::{error_banner, fetch_list, notice_from_query, page_response, AppState, NoticeQuery};

fn verification_badge(identity: &Identity) -> String {
    identity
        .verification_status()
        .map(status_badge)
        .unwrap_or_else(|| "—".to_string())
}

pub async fn page_identities(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let body = match fetch_list::<Identity>(&state, "/identities", "Error fetching identities").await {
        Ok(identities) => {
            let rows: Vec<Vec<String>> = identities
                .iter()
                .map(|i| {
                    vec![
                        link(&format!("/identities/{}", segment(&i.identity_id)), &i.display_name()),
                        i.identity_type.to_string(),
                        escape_html(&i.email_address),
                        escape_html(&i.category),
                        verification_badge(i),
                        display_date(i.created_at.as_deref()),
                    ]
                })
                .collect();
            table(
                &["Name", "Type", "Email", "Category", "Verification", "Created"],
                &rows,
                "No identities yet",
            )
        }
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error fetching identities: {}", e);
            error_banner(&e.to_string())
        }
    };

    let inner_content = format!(
        "{}{}{}",
        notice_from_query(&query),
        page_header("Identities", Some(("/identities/create", "New identity"))),
        body
    );
    Html(page_response(&headers, "Identities", "/identities", &inner_content))
}

pub async fn page_identity_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<NoticeQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let path = format!("/identities/{}", segment(&id));
    let inner_content = match state.upstream.get_json::<Identity>(&path, "Error fetching identity").await {
        Ok(identity) => {
            let address = [
                identity.street.as_str(),
                identity.city.as_str(),
                identity.state.as_str(),
                identity.post_code.as_str(),
                identity.country.as_str(),
            ]
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
            let or_dash = |v: &str| if v.is_empty() { "—".to_string() } else { v.to_string() };
            let meta = serde_json::to_string_pretty(&identity.meta_data).unwrap_or_default();

            format!(
                r#"{}{}
                <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
                    <div class='flex items-center gap-2 mb-4'><span class='text-sm text-gray-500'>Verification</span>{}</div>
                    <div class='grid grid-cols-2 lg:grid-cols-3 gap-4'>{}{}{}{}{}{}{}{}{}</div>
                </div>
                <div class='bg-white rounded-xl shadow-sm p-6'>
                    <h3 class='text-lg font-semibold mb-2'>Metadata</h3>
                    <pre class='text-xs bg-gray-50 p-3 rounded overflow-x-auto'>{}</pre>
                </div>"#,
                notice_from_query(&query),
                page_header(&identity.display_name(), None),
                verification_badge(&identity),
                detail_row("Identity ID", &identity.identity_id),
                detail_row("Type", &identity.identity_type.to_string()),
                detail_row("Email", &or_dash(&identity.email_address)),
                detail_row("Phone", &or_dash(&identity.phone_number)),
                detail_row("Category", &or_dash(&identity.category)),
                detail_row("Date of birth", &or_dash(&identity.dob)),
                detail_row("Nationality", &or_dash(&identity.nationality)),
                detail_row("Address", &or_dash(&address)),
                detail_row("Created", &display_date(identity.created_at.as_deref())),
                escape_html(&meta)
            )
        }
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error fetching identity {}: {}", id, e);
            format!("{}{}", page_header("Identity", None), error_banner(&e.to_string()))
        }
    };

    Html(page_response(&headers, "Identity", "/identities", &inner_content))
}

fn identity_form(form: &IdentityForm, errors: &[FieldError], banner: &str) -> String {
    let types = vec![
        (IdentityType::Individual.to_string(), "Individual".to_string()),
        (IdentityType::Organization.to_string(), "Organization".to_string()),
    ];
    let selected = if form.identity_type.is_empty() {
        IdentityType::default().to_string()
    } else {
        form.identity_type.clone()
    };

    format!(
        r#"{}{}
        <form method='post' action='/identities/create' class='bg-white rounded-xl shadow-sm p-6 max-w-3xl'>
            {}
            <div class='grid grid-cols-1 md:grid-cols-2 gap-x-4'>{}{}{}{}{}{}{}{}{}{}</div>
            <h3 class='text-sm font-semibold text-gray-600 mt-2 mb-3'>Address</h3>
            <div class='grid grid-cols-1 md:grid-cols-2 gap-x-4'>{}{}{}{}{}</div>
            {}
            <div class='flex gap-2'>{}<a href='/identities' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancel</a></div>
        </form>"#,
        page_header("Create identity", None),
        banner,
        select_input("identity_type", "Identity type", &types, &selected, errors),
        text_input("first_name", "First name", &form.first_name, errors, ""),
        text_input("last_name", "Last name", &form.last_name, errors, ""),
        text_input("other_names", "Other names", &form.other_names, errors, ""),
        text_input("organization_name", "Organization name", &form.organization_name, errors, ""),
        text_input("email_address", "Email address", &form.email_address, errors, "type='email'"),
        text_input("phone_number", "Phone number", &form.phone_number, errors, ""),
        text_input("gender", "Gender", &form.gender, errors, ""),
        text_input("dob", "Date of birth", &form.dob, errors, "placeholder='YYYY-MM-DD'"),
        text_input("nationality", "Nationality", &form.nationality, errors, ""),
        text_input("category", "Category", &form.category, errors, "placeholder='customer'"),
        text_input("street", "Street", &form.street, errors, ""),
        text_input("city", "City", &form.city, errors, ""),
        text_input("state", "State", &form.state, errors, ""),
        text_input("post_code", "Post code", &form.post_code, errors, ""),
        text_input("country", "Country", &form.country, errors, ""),
        text_input("customer_id", "Customer ID (optional)", &form.customer_id, errors, ""),
        submit_button("Create identity")
    )
}

pub async fn page_identity_create(headers: HeaderMap) -> Html<String> {
    let inner_content = identity_form(&IdentityForm::default(), &[], "");
    Html(page_response(&headers, "Create identity", "/identities", &inner_content))
}

/// Validate, create upstream with pending manual verification, then show the new identity
pub async fn page_identity_store(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<IdentityForm>,
) -> Response {
    let rerender = |errors: &[FieldError], banner: String| {
        let inner_content = identity_form(&form, errors, &banner);
        Html(page_response(&headers, "Create identity", "/identities", &inner_content)).into_response()
    };

    if let Err(e) = form.validate() {
        return rerender(e.field_errors(), error_banner(&e.to_string()));
    }

    let created: Result<Identity, _> = state
        .upstream
        .post_json("/identities", &form.to_identity(Utc::now()), "Error creating identity")
        .await;
    match created {
        Ok(identity) => {
            log::info!(target: "ledgerdesk::pages", "Created identity {}", identity.identity_id);
            Redirect::to(&format!(
                "/identities/{}?notice={}",
                segment(&identity.identity_id),
                urlencoding::encode("Identity created successfully")
            ))
            .into_response()
        }
        Err(e) => {
            log::error!(target: "ledgerdesk::pages", "Error creating identity: {}", e);
            rerender(&[], error_banner(&e.to_string()))
        }
    }
}
