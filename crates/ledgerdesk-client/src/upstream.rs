//! Outbound calls to the ledger service
//!
//! One request per call: no retry, no backoff, no explicit timeout.

use ledgerdesk_config::{AuthScheme, UpstreamConfig};
use ledgerdesk_core::ApiKeyRequest;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{extract_message, ClientError};

/// Status and parsed body of an upstream reply
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    /// `Value::Null` when the body was empty or not JSON
    pub body: Value,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body on 2xx, otherwise an `Upstream` error carrying the best message available
    pub fn into_result(self, default_message: &str) -> Result<Value, ClientError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(ClientError::Upstream {
                status: self.status,
                message: extract_message(&self.body)
                    .unwrap_or_else(|| default_message.to_string()),
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    scheme: AuthScheme,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            scheme: config.auth_scheme,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Header carrying the API key under the configured scheme
    pub fn auth_header(&self) -> Option<(&'static str, String)> {
        let key = self.api_key.as_ref()?;
        Some(match self.scheme {
            AuthScheme::BlnkKey => ("X-Blnk-Key", key.clone()),
            AuthScheme::Bearer => ("Authorization", format!("Bearer {}", key)),
            AuthScheme::Basic => ("Authorization", format!("Basic {}", key)),
        })
    }

    /// Perform exactly one request and return whatever came back
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!(target: "ledgerdesk::upstream", "{} {}", method, url);

        let mut request = self
            .http
            .request(method, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some((name, value)) = self.auth_header() {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Ok(UpstreamResponse { status, body })
    }

    /// GET and decode, mapping non-2xx to `ClientError::Upstream`
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        default_message: &str,
    ) -> Result<T, ClientError> {
        let body = self
            .send(Method::GET, path, None)
            .await?
            .into_result(default_message)?;
        Ok(serde_json::from_value(body)?)
    }

    /// POST a typed body and decode the reply
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        default_message: &str,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)?;
        let reply = self
            .send(Method::POST, path, Some(&body))
            .await?
            .into_result(default_message)?;
        Ok(serde_json::from_value(reply)?)
    }

    /// Mint an API key on the ledger service
    pub async fn create_api_key(&self, request: &ApiKeyRequest) -> Result<Value, ClientError> {
        self.post_json("/api-keys", request, "Error creating API key")
            .await
    }
}
