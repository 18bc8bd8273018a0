//! Configuration management for ledgerdesk
//!
//! This module handles loading, validation, and management of
//! ledgerdesk configuration from YAML files and environment overrides.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// How the API key is presented to the upstream ledger service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `X-Blnk-Key: <key>`
    BlnkKey,
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `Authorization: Basic <key>`
    Basic,
}

impl Default for AuthScheme {
    fn default() -> Self {
        AuthScheme::BlnkKey
    }
}

impl std::str::FromStr for AuthScheme {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "blnk_key" | "x_blnk_key" => Ok(AuthScheme::BlnkKey),
            "bearer" => Ok(AuthScheme::Bearer),
            "basic" => Ok(AuthScheme::Basic),
            _ => Err(format!("Invalid auth scheme: {}", s)),
        }
    }
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthScheme::BlnkKey => write!(f, "blnk_key"),
            AuthScheme::Bearer => write!(f, "bearer"),
            AuthScheme::Basic => write!(f, "basic"),
        }
    }
}

/// Upstream ledger service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the ledger API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key or token
    #[serde(default)]
    pub api_key: Option<String>,
    /// Header scheme used to present the key
    #[serde(default)]
    pub auth_scheme: AuthScheme,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            auth_scheme: AuthScheme::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

/// Wallet defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletsConfig {
    /// Ledger that new wallets are opened in
    #[serde(default)]
    pub default_ledger_id: Option<String>,
    /// Currency preselected on forms
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl Default for WalletsConfig {
    fn default() -> Self {
        Self {
            default_ledger_id: None,
            default_currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Local persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted state blob
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data")
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream ledger API
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Wallet defaults
    #[serde(default)]
    pub wallets: WalletsConfig,
    /// Local persistence
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Checked in order, first hit wins.
const BASE_URL_VARS: &[&str] = &[
    "BLNK_API_URL",
    "NEXT_PUBLIC_BLNK_API_URL",
    "BLNK_API_BASE",
    "NEXT_PUBLIC_BLNK_API_BASE",
];
const API_KEY_VARS: &[&str] = &["BLNK_API_KEY", "NEXT_PUBLIC_BLNK_API_KEY", "API_KEY"];
const AUTH_SCHEME_VARS: &[&str] = &["BLNK_AUTH_SCHEME"];
const LEDGER_ID_VARS: &[&str] = &["BLNK_LEDGER_ID"];

impl Config {
    /// Load configuration from a YAML file, then apply `.env` and process
    /// environment overrides. A missing file yields the defaults.
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            log::warn!("Config file {} not found, using defaults", path.display());
            Config::default()
        };

        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }
        config.apply_env_with(|name| std::env::var(name).ok())?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file without env overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML content
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .find(|value| !value.trim().is_empty())
        };

        if let Some(url) = first(BASE_URL_VARS) {
            self.upstream.base_url = url;
        }
        if let Some(key) = first(API_KEY_VARS) {
            self.upstream.api_key = Some(key);
        }
        if let Some(scheme) = first(AUTH_SCHEME_VARS) {
            self.upstream.auth_scheme = scheme.parse().map_err(|reason| ConfigError::InvalidValue {
                field: "BLNK_AUTH_SCHEME".to_string(),
                reason,
            })?;
        }
        if let Some(ledger_id) = first(LEDGER_ID_VARS) {
            self.wallets.default_ledger_id = Some(ledger_id);
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        let base_url = self.upstream.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "upstream.base_url".to_string(),
            });
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "upstream.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.wallets.default_currency.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "wallets.default_currency".to_string(),
                reason: "Default currency must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Copy of the configuration safe to display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.upstream.api_key.is_some() {
            copy.upstream.api_key = Some("********".to_string());
        }
        copy
    }
}
