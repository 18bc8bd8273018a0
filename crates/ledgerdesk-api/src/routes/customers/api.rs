//! Customers API endpoints

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use serde_json::Value;

use crate::error::ErrorStyle;
use crate::routes::proxy::{json_body, relay, segment, ApiResult};
use crate::AppState;

const STYLE: ErrorStyle = ErrorStyle::Flagged;

fn customer_path(id: &str) -> String {
    format!("/customers/{}", segment(id))
}

pub async fn api_customer_detail(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    relay(&state, Method::GET, &customer_path(&id), None, StatusCode::OK, STYLE, "Error fetching customer").await
}

pub async fn api_customer_update(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> ApiResult {
    let body: Value = json_body(STYLE, &body)?;
    relay(&state, Method::PUT, &customer_path(&id), Some(&body), StatusCode::OK, STYLE, "Error updating customer").await
}

pub async fn api_customer_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    relay(&state, Method::DELETE, &customer_path(&id), None, StatusCode::OK, STYLE, "Error deleting customer").await
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_customer_roundtrip_methods() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/customers/cus_1", 200, json!({"id": "cus_1"}));

        let res = call(&app, "GET", "/api/customers/cus_1", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json()["id"], "cus_1");

        let res = call(&app, "PUT", "/api/customers/cus_1", Some(json!({"name": "Ada"}))).await;
        assert_eq!(res.status, StatusCode::OK);
        let sent = mock.last();
        assert_eq!((sent.method.as_str(), sent.path.as_str()), ("PUT", "/customers/cus_1"));
        assert_eq!(sent.body, json!({"name": "Ada"}));

        let res = call(&app, "DELETE", "/api/customers/cus_1", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(mock.last().method, "DELETE");
    }

    #[tokio::test]
    async fn test_flagged_error_body() {
        let (app, mock, _dir) = test_app().await;
        mock.reply("GET", "/customers/missing", 404, json!({"error": "customer not found"}));

        let res = call(&app, "GET", "/api/customers/missing", None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.json(), json!({"message": "customer not found", "error": true}));

        let res = call(&app, "PATCH", "/api/customers/cus_1", None).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers["allow"], "GET, PUT, DELETE");
    }
}
