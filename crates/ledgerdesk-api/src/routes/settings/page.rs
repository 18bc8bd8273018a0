//! Settings page

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use ledgerdesk_utils::escape_html;

use crate::routes::widgets::{detail_row, page_header};
use crate::{page_response, AppState};

pub async fn page_settings(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let config = state.config.redacted();
    let raw = serde_json::to_string_pretty(&config).unwrap_or_default();

    let inner_content = format!(
        r#"{}
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Upstream</h3>
            <div class='grid grid-cols-2 gap-4'>{}{}{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Server</h3>
            <div class='grid grid-cols-2 gap-4'>{}{}{}{}{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-2'>Effective configuration</h3>
            <pre class='text-xs bg-gray-50 p-3 rounded overflow-x-auto'>{}</pre>
        </div>"#,
        page_header("Settings", None),
        detail_row("Base URL", &config.upstream.base_url),
        detail_row("Auth scheme", &config.upstream.auth_scheme.to_string()),
        detail_row("API key", config.upstream.api_key.as_deref().unwrap_or("not set")),
        detail_row("Bind address", &config.bind_addr()),
        detail_row("Default ledger", config.wallets.default_ledger_id.as_deref().unwrap_or("—")),
        detail_row("Default currency", &config.wallets.default_currency),
        detail_row("Storage", &state.store.path().display().to_string()),
        detail_row("Log level", &config.logging.level),
        escape_html(&raw)
    );
    Html(page_response(&headers, "Settings", "/settings", &inner_content))
}

#[cfg(test)]
mod tests {
    use crate::testing::*;

    #[tokio::test]
    async fn test_settings_page_hides_key() {
        let (app, _, _dir) = test_app().await;
        let html = call(&app, "GET", "/settings", None).await.text();
        assert!(html.contains("Auth scheme"));
        assert!(html.contains("********"));
        assert!(html.contains("SERVICE.json"));
        assert!(!html.contains("test-key"));
    }
}
