//! Ledgerdesk main entry point

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use ledgerdesk_api::start_server;
use ledgerdesk_client::{ProxyClient, UpstreamClient};
use ledgerdesk_config::Config;
use ledgerdesk_core::{ApiKeyRequest, LedgerMeta, LedgerRequest, DEFAULT_API_KEY_SCOPES};
use serde::Serialize;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "ledgerdesk")]
#[command(author = "Ledgerdesk Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight admin panel and API proxy for a Blnk ledger", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// Base URL of a running ledgerdesk server, for the client subcommands
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the admin panel and API proxy (default)
    Serve,
    /// Write a default configuration file
    InitConfig {
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Create an upstream API key with the standard scopes
    ApiKey {
        #[arg(long, default_value = "ledgerdesk")]
        name: String,
        #[arg(long, default_value = "admin")]
        owner: String,
        /// Days until the key expires
        #[arg(long, default_value_t = 365)]
        days: i64,
    },
    /// Ledgers through the proxy
    #[command(subcommand)]
    Ledgers(LedgerCommand),
    /// Balances through the proxy
    #[command(subcommand)]
    Balances(BalanceCommand),
    /// Transactions through the proxy
    #[command(subcommand)]
    Transactions(TransactionCommand),
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    List,
    Get { id: String },
    Create {
        name: String,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum BalanceCommand {
    List {
        #[arg(long)]
        ledger: Option<String>,
    },
    Get { id: String },
    History { id: String },
}

#[derive(Subcommand, Debug)]
enum TransactionCommand {
    List {
        #[arg(long, conflicts_with = "balance")]
        ledger: Option<String>,
        #[arg(long)]
        balance: Option<String>,
    },
    Get { id: String },
    Commit { id: String },
    Void { id: String },
}

fn init_logging(level: &str) {
    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Proxy address for the client subcommands; the bind host may be a wildcard
fn proxy_url(args: &Args, config: &Config) -> String {
    match &args.server {
        Some(url) => url.clone(),
        None => {
            let host = match config.server.host.as_str() {
                "0.0.0.0" | "::" | "" => "127.0.0.1",
                host => host,
            };
            format!("http://{}:{}", host, config.server.port)
        }
    }
}

fn init_config(output: &Path, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", output.display());
    }
    std::fs::write(output, Config::generate_default())
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Wrote default configuration to {}", output.display());
    Ok(())
}

/// RFC 3339 expiry `days` after `now`; the key must expire in the future
fn key_expiry(now: DateTime<Utc>, days: i64) -> anyhow::Result<String> {
    if days <= 0 {
        bail!("--days must be positive, got {}", days);
    }
    let expires = Duration::try_days(days)
        .and_then(|d| now.checked_add_signed(d))
        .with_context(|| format!("--days {} is out of range", days))?;
    Ok(expires.to_rfc3339_opts(SecondsFormat::Secs, true))
}

async fn create_api_key(config: &Config, name: String, owner: String, days: i64) -> anyhow::Result<()> {
    let expires_at = key_expiry(Utc::now(), days)?;
    let client = UpstreamClient::new(&config.upstream)?;
    let request = ApiKeyRequest {
        name,
        owner,
        scopes: DEFAULT_API_KEY_SCOPES.iter().map(|s| s.to_string()).collect(),
        expires_at,
    };
    let key = client.create_api_key(&request).await?;
    print_json(&key)
}

async fn run_ledgers(client: &ProxyClient, command: LedgerCommand) -> anyhow::Result<()> {
    let ledgers = client.ledgers();
    match command {
        LedgerCommand::List => print_json(&ledgers.get_all_ledgers().await?),
        LedgerCommand::Get { id } => print_json(&ledgers.get_ledger(&id).await?),
        LedgerCommand::Create {
            name,
            owner,
            description,
        } => {
            let request = LedgerRequest {
                name,
                meta_data: LedgerMeta {
                    project_owner: owner,
                    description,
                    ..Default::default()
                },
            };
            print_json(&ledgers.create_ledger(&request).await?)
        }
        LedgerCommand::Delete { id } => {
            ledgers.delete_ledger(&id).await?;
            log::info!("Deleted ledger {}", id);
            Ok(())
        }
    }
}

async fn run_balances(client: &ProxyClient, command: BalanceCommand) -> anyhow::Result<()> {
    let balances = client.balances();
    match command {
        BalanceCommand::List { ledger: Some(ledger) } => {
            print_json(&balances.get_balances_by_ledger(&ledger).await?)
        }
        BalanceCommand::List { ledger: None } => print_json(&balances.get_all_balances().await?),
        BalanceCommand::Get { id } => print_json(&balances.get_balance(&id).await?),
        BalanceCommand::History { id } => print_json(&balances.get_balance_history(&id).await?),
    }
}

async fn run_transactions(client: &ProxyClient, command: TransactionCommand) -> anyhow::Result<()> {
    let transactions = client.transactions();
    match command {
        TransactionCommand::List {
            ledger: Some(ledger),
            ..
        } => print_json(&transactions.get_transactions_by_ledger(&ledger).await?),
        TransactionCommand::List {
            balance: Some(balance),
            ..
        } => print_json(&transactions.get_transactions_by_balance(&balance).await?),
        TransactionCommand::List { .. } => print_json(&transactions.get_all_transactions().await?),
        TransactionCommand::Get { id } => print_json(&transactions.get_transaction(&id).await?),
        TransactionCommand::Commit { id } => print_json(&transactions.commit_transaction(&id).await?),
        TransactionCommand::Void { id } => print_json(&transactions.void_transaction(&id).await?),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(Command::InitConfig { output, force }) = &args.command {
        init_logging("info");
        return init_config(output, *force);
    }

    let loaded = Config::load(args.config.clone());
    init_logging(
        loaded
            .as_ref()
            .map(|c| c.logging.level.as_str())
            .unwrap_or("info"),
    );
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            for suggestion in e.to_details().suggestions {
                log::error!("Hint: {}", suggestion);
            }
            return Err(e).context(format!("Failed to load {}", args.config.display()));
        }
    };
    log::info!(
        "Config loaded: upstream={}, storage={}",
        config.upstream.base_url,
        config.storage.path.display()
    );

    let rt = Runtime::new()?;
    rt.block_on(async move {
        let client = ProxyClient::new(&proxy_url(&args, &config));
        match args.command {
            None | Some(Command::Serve) => start_server(config).await,
            Some(Command::InitConfig { .. }) => Ok(()),
            Some(Command::ApiKey { name, owner, days }) => create_api_key(&config, name, owner, days).await,
            Some(Command::Ledgers(command)) => run_ledgers(&client, command).await,
            Some(Command::Balances(command)) => run_balances(&client, command).await,
            Some(Command::Transactions(command)) => run_transactions(&client, command).await,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_key_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(key_expiry(now, 365).unwrap(), "2025-05-01T12:00:00Z");
        assert!(key_expiry(now, 0).is_err());
        assert!(key_expiry(now, -30).is_err());
        assert!(key_expiry(now, i64::MAX).is_err());
        assert!(key_expiry(now, 100_000_000).is_err());
    }

    #[test]
    fn test_proxy_url_maps_wildcard_host() {
        let args = Args::parse_from(["ledgerdesk"]);
        let mut config = Config::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8081;
        assert_eq!(proxy_url(&args, &config), "http://127.0.0.1:8081");

        let args = Args::parse_from(["ledgerdesk", "--server", "http://desk:9000"]);
        assert_eq!(proxy_url(&args, &config), "http://desk:9000");
    }
}
