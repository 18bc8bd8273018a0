//! Basic enumerations shared by the models

use serde::{Deserialize, Serialize};

/// Identity type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityType {
    /// A natural person
    Individual,
    /// A company or other organization
    Organization,
}

impl Default for IdentityType {
    fn default() -> Self {
        IdentityType::Individual
    }
}

impl std::str::FromStr for IdentityType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "individual" => Ok(IdentityType::Individual),
            "organization" | "organisation" => Ok(IdentityType::Organization),
            _ => Err(format!("Invalid identity type: {}", s)),
        }
    }
}

impl std::fmt::Display for IdentityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityType::Individual => write!(f, "individual"),
            IdentityType::Organization => write!(f, "organization"),
        }
    }
}

/// Kind of money movement, recorded in `meta_data.transaction_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// External funds into a balance
    Deposit,
    /// Funds out of a balance to the outside world
    Withdrawal,
    /// Movement between two balances
    InternalTransfer,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "deposit"),
            TransactionType::Withdrawal => write!(f, "withdrawal"),
            TransactionType::InternalTransfer => write!(f, "internal_transfer"),
        }
    }
}

/// Sub-actions of the hold/commit/void lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAction {
    Hold,
    Commit,
    Void,
}

impl std::str::FromStr for TransactionAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hold" => Ok(TransactionAction::Hold),
            "commit" => Ok(TransactionAction::Commit),
            "void" => Ok(TransactionAction::Void),
            _ => Err(format!("Invalid transaction action: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionAction::Hold => write!(f, "hold"),
            TransactionAction::Commit => write!(f, "commit"),
            TransactionAction::Void => write!(f, "void"),
        }
    }
}
