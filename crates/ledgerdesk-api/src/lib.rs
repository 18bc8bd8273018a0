//! API proxy and HTMX admin pages
//!
//! Routes are organized into modules:
//! - routes::ledgers: Ledger proxy, list/detail/create pages
//! - routes::balances: Balance proxy, shared balance detail loading
//! - routes::identities / routes::customers: Identity proxy and pages
//! - routes::wallets / routes::cards: Wallet and card balance pages
//! - routes::transactions: Transaction proxy, deposit/transfer, list page
//! - routes::store / routes::settings: Local persistence and configuration

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::Html,
    routing::{get, post},
    Router,
};
use ledgerdesk_client::{ClientError, UpstreamClient};
use ledgerdesk_config::Config;
use ledgerdesk_core::{Balance, Identity, Ledger, LocalStore};
use ledgerdesk_utils::escape_html;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ErrorStyle};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: UpstreamClient,
    pub store: Arc<LocalStore>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let store = LocalStore::new(&config.storage.path);
        Ok(Self {
            config: Arc::new(config),
            upstream,
            store: Arc::new(store),
        })
    }
}

/// `?notice=` carried by post-redirect-get
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::balances::{api_balance_create, api_balance_detail, api_balances};
    use routes::cards::{page_card_create, page_card_detail, page_card_fund, page_card_store, page_cards};
    use routes::customers::{api_customer_delete, api_customer_detail, api_customer_update};
    use routes::identities::{
        api_identities, api_identity_create, api_identity_create_from_form, api_identity_delete,
        api_identity_detail, api_identity_update, page_identities, page_identity_create,
        page_identity_detail, page_identity_store,
    };
    use routes::ledgers::{
        api_ledger_create, api_ledger_delete, api_ledger_detail, api_ledger_update, api_ledgers,
        page_ledger_create, page_ledger_detail, page_ledger_store, page_ledgers,
    };
    use routes::proxy::with_allow;
    use routes::settings::{api_settings, page_settings};
    use routes::store::{api_store_delete, api_store_get, api_store_put};
    use routes::transactions::{
        api_deposit, api_transaction_delete, api_transaction_detail, api_transaction_post,
        api_transaction_update, api_transactions, api_transfer, page_transactions,
    };
    use routes::wallets::{
        api_wallet_create, page_wallet_create, page_wallet_deposit, page_wallet_detail,
        page_wallet_store, page_wallet_withdraw, page_wallets,
    };

    let api = Router::new()
        .route("/api/health", with_allow(get(health_check), "GET"))
        .route(
            "/api/ledgers",
            with_allow(
                get(api_ledgers)
                    .post(api_ledger_create)
                    .patch(api_ledger_update)
                    .delete(api_ledger_delete),
                "GET, POST, PATCH, DELETE",
            ),
        )
        .route("/api/ledgers/:id", with_allow(get(api_ledger_detail), "GET"))
        .route(
            "/api/balances",
            with_allow(get(api_balances).post(api_balance_create), "GET, POST"),
        )
        .route("/api/balances/:id", with_allow(get(api_balance_detail), "GET"))
        .route(
            "/api/identities",
            with_allow(get(api_identities).post(api_identity_create), "GET, POST"),
        )
        .route(
            "/api/identities/create",
            with_allow(post(api_identity_create_from_form), "POST"),
        )
        .route(
            "/api/identities/:id",
            with_allow(
                get(api_identity_detail)
                    .put(api_identity_update)
                    .delete(api_identity_delete),
                "GET, PUT, DELETE",
            ),
        )
        .route(
            "/api/customers/:id",
            with_allow(
                get(api_customer_detail)
                    .put(api_customer_update)
                    .delete(api_customer_delete),
                "GET, PUT, DELETE",
            ),
        )
        .route(
            "/api/transactions",
            with_allow(get(api_transactions).post(api_transaction_post), "GET, POST"),
        )
        .route("/api/transactions/deposit", with_allow(post(api_deposit), "POST"))
        .route("/api/transactions/transfer", with_allow(post(api_transfer), "POST"))
        .route(
            "/api/transactions/:id",
            with_allow(
                get(api_transaction_detail)
                    .put(api_transaction_update)
                    .delete(api_transaction_delete),
                "GET, PUT, DELETE",
            ),
        )
        .route("/api/wallets/create", with_allow(post(api_wallet_create), "POST"))
        .route(
            "/api/store",
            with_allow(
                get(api_store_get).put(api_store_put).delete(api_store_delete),
                "GET, PUT, DELETE",
            ),
        )
        .route("/api/settings", with_allow(get(api_settings), "GET"))
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(api)
        // HTMX page routes
        .route("/", get(page_dashboard))
        .route("/dashboard", get(page_dashboard))
        .route("/ledgers", get(page_ledgers))
        .route("/ledgers/create", get(page_ledger_create).post(page_ledger_store))
        .route("/ledgers/:id", get(page_ledger_detail))
        .route("/identities", get(page_identities))
        .route("/identities/create", get(page_identity_create).post(page_identity_store))
        .route("/identities/:id", get(page_identity_detail))
        .route("/wallets", get(page_wallets))
        .route("/wallets/create", get(page_wallet_create).post(page_wallet_store))
        .route("/wallets/:id", get(page_wallet_detail))
        .route("/wallets/:id/deposit", post(page_wallet_deposit))
        .route("/wallets/:id/withdraw", post(page_wallet_withdraw))
        .route("/cards", get(page_cards))
        .route("/cards/create", get(page_card_create).post(page_card_store))
        .route("/cards/:id", get(page_card_detail))
        .route("/cards/:id/fund", post(page_card_fund))
        .route("/transactions", get(page_transactions))
        .route("/settings", get(page_settings))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// GET a JSON array; a `null` body reads as empty
pub(crate) async fn fetch_list<T: DeserializeOwned>(
    state: &AppState,
    path: &str,
    default_message: &str,
) -> Result<Vec<T>, ClientError> {
    let items: Option<Vec<T>> = state.upstream.get_json(path, default_message).await?;
    Ok(items.unwrap_or_default())
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Ledgerdesk</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "Dashboard", "dashboard"),
        ("/ledgers", "Ledgers", "ledgers"),
        ("/identities", "Identities", "identities"),
        ("/wallets", "Wallets", "wallets"),
        ("/cards", "Cards", "cards"),
        ("/transactions", "Transactions", "transactions"),
        ("/settings", "Settings", "settings"),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Ledgerdesk</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, id) in &links {
        let is_active = if *path == "/" {
            current_path == "/" || current_path == "/dashboard"
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        let icon = match *id {
            "dashboard" => "📊",
            "ledgers" => "📒",
            "identities" => "👤",
            "wallets" => "👛",
            "cards" => "💳",
            "transactions" => "📋",
            "settings" => "⚙️",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(
            r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#,
            inner_content
        )
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Green success banner
pub fn notice_banner(message: &str) -> String {
    format!(
        r#"<div class='mb-4 bg-green-50 border border-green-200 rounded-lg p-4' role='status'><div class='flex items-center gap-2'><span class='text-green-600'>✓</span><span class='font-medium text-green-800'>{}</span></div></div>"#,
        escape_html(message)
    )
}

/// Red failure banner
pub fn error_banner(message: &str) -> String {
    format!(
        r#"<div class='mb-4 bg-red-50 border border-red-200 rounded-lg p-4' role='alert'><div class='flex items-center gap-2'><span class='text-red-600'>✗</span><span class='font-medium text-red-800'>{}</span></div></div>"#,
        escape_html(message)
    )
}

/// Banner for an optional `?notice=`
pub fn notice_from_query(query: &NoticeQuery) -> String {
    query
        .notice
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(notice_banner)
        .unwrap_or_default()
}

fn stat_card(label: &str, value: Option<usize>, href: &str, color: &str) -> String {
    let value = value.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string());
    format!(
        r#"<a href='{href}' class='block bg-{color}-50 p-4 rounded-lg border border-{color}-200 hover:shadow'><p class='text-sm text-{color}-600'>{label}</p><p class='text-2xl font-bold text-{color}-700'>{value}</p></a>"#
    )
}

/// Dashboard with entity counts and quick links
async fn page_dashboard(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let (ledgers, identities, balances) = tokio::join!(
        fetch_list::<Ledger>(&state, "/ledgers", "Error fetching ledgers"),
        fetch_list::<Identity>(&state, "/identities", "Error fetching identities"),
        fetch_list::<Balance>(&state, "/balances", "Error fetching balances"),
    );

    let mut failures = Vec::new();
    for err in [ledgers.as_ref().err(), identities.as_ref().err(), balances.as_ref().err()]
        .into_iter()
        .flatten()
    {
        log::error!(target: "ledgerdesk::pages", "Dashboard lookup failed: {}", err);
        failures.push(err.to_string());
    }

    let wallets = balances
        .as_ref()
        .ok()
        .map(|b| b.iter().filter(|b| !b.is_card()).count());
    let cards = balances
        .as_ref()
        .ok()
        .map(|b| b.iter().filter(|b| b.is_card()).count());

    let features = [
        ("Ledgers", "Group balances by purpose or product.", "/ledgers", "/ledgers/create"),
        ("Identities", "Customers and organizations that own balances.", "/identities", "/identities/create"),
        ("Wallets", "Open wallets, deposit and withdraw funds.", "/wallets", "/wallets/create"),
        ("Cards", "Issue card balances and fund them from wallets.", "/cards", "/cards/create"),
    ];
    let feature_cards: String = features
        .iter()
        .map(|(title, blurb, list, create)| {
            format!(
                r#"<div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-2'>{title}</h3><p class='text-sm text-gray-500 mb-4'>{blurb}</p><div class='flex gap-2'><a href='{list}' class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50'>View all</a><a href='{create}' class='px-3 py-1.5 text-sm bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Create</a></div></div>"#
            )
        })
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Dashboard</h2></div>
        {}
        <div class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4 mb-6'>{}{}{}{}</div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>{}</div>"#,
        failures.first().map(|m| error_banner(m)).unwrap_or_default(),
        stat_card("Ledgers", ledgers.as_ref().ok().map(Vec::len), "/ledgers", "indigo"),
        stat_card("Identities", identities.as_ref().ok().map(Vec::len), "/identities", "blue"),
        stat_card("Wallets", wallets, "/wallets", "green"),
        stat_card("Card balances", cards, "/cards", "yellow"),
        feature_cards
    );

    Html(page_response(&headers, "Dashboard", "/", &inner_content))
}

/// Start the HTTP server
///
/// Binds `server.host:server.port` and serves until Ctrl-C.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    log::info!(
        "Proxying {} with auth scheme {}",
        config.upstream.base_url,
        config.upstream.auth_scheme
    );
    if config.upstream.api_key.as_deref().map_or(true, str::is_empty) {
        log::warn!("No upstream API key configured; requests go out unauthenticated");
    }

    let state = AppState::new(config)?;
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Ledgerdesk server on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process upstream stand-in and request helpers for router tests

    use super::*;
    use axum::body::{Body, Bytes};
    use axum::http::{Method, Request, StatusCode, Uri};
    use axum::Json;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub method: String,
        pub path: String,
        pub auth: Option<String>,
        pub body: Value,
    }

    type Replies = HashMap<(String, String), (u16, Value)>;

    /// Records every call; replies are scripted per method and path, otherwise
    /// 200 with `{"path": ...}`
    #[derive(Clone, Default)]
    pub struct MockUpstream {
        calls: Arc<Mutex<Vec<Recorded>>>,
        replies: Arc<Mutex<Replies>>,
    }

    impl MockUpstream {
        pub fn reply(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .insert((method.to_string(), path.to_string()), (status, body));
            self
        }

        pub fn calls(&self) -> Vec<Recorded> {
            self.calls.lock().unwrap().clone()
        }

        pub fn last(&self) -> Recorded {
            self.calls().pop().expect("no upstream call recorded")
        }
    }

    async fn mock_handler(
        State(mock): State<MockUpstream>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> (StatusCode, Json<Value>) {
        let path = uri.path().to_string();
        let auth = headers
            .get("x-blnk-key")
            .or_else(|| headers.get("authorization"))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        mock.calls.lock().unwrap().push(Recorded {
            method: method.to_string(),
            path: path.clone(),
            auth,
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });

        let scripted = mock
            .replies
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.clone()))
            .cloned();
        match scripted {
            Some((status, body)) => (StatusCode::from_u16(status).unwrap(), Json(body)),
            None => (StatusCode::OK, Json(serde_json::json!({ "path": path }))),
        }
    }

    /// Serve `mock` on an ephemeral local port and return its base URL
    pub async fn spawn_upstream(mock: &MockUpstream) -> String {
        let upstream = Router::new()
            .fallback(mock_handler)
            .with_state(mock.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// State pointing at `mock`, with an isolated store directory
    pub async fn test_state(mock: &MockUpstream) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.upstream.base_url = spawn_upstream(mock).await;
        config.upstream.api_key = Some("test-key".to_string());
        config.storage.path = dir.path().to_path_buf();
        (AppState::new(config).unwrap(), dir)
    }

    /// Router wired to a fresh mock upstream
    pub async fn test_app() -> (Router, MockUpstream, tempfile::TempDir) {
        let mock = MockUpstream::default();
        let (state, dir) = test_state(&mock).await;
        (create_router(state), mock, dir)
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Bytes,
    }

    impl TestResponse {
        pub fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap()
        }

        pub fn text(&self) -> String {
            String::from_utf8_lossy(&self.body).into_owned()
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> TestResponse {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse { status, headers, body }
    }

    pub async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        send(router, request).await
    }

    pub async fn submit_form(router: &Router, uri: &str, form: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        send(router, request).await
    }

    pub async fn htmx_get(router: &Router, uri: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .header("hx-request", "true")
            .body(Body::empty())
            .unwrap();
        send(router, request).await
    }
}
