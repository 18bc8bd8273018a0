//! Client-generated transaction references

use chrono::{DateTime, Utc};

/// Prefix family for generated references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `DEP-<unix millis>`
    Deposit,
    /// `WD-<unix millis>`
    Withdrawal,
    /// `TRF-<YYYYMMDDHHMMSS>`
    Transfer,
}

impl ReferenceKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ReferenceKind::Deposit => "DEP",
            ReferenceKind::Withdrawal => "WD",
            ReferenceKind::Transfer => "TRF",
        }
    }

    /// Reference for an attempt made at `now`
    pub fn generate_at(&self, now: DateTime<Utc>) -> String {
        match self {
            ReferenceKind::Deposit | ReferenceKind::Withdrawal => {
                format!("{}-{}", self.prefix(), now.timestamp_millis())
            }
            ReferenceKind::Transfer => format!("{}-{}", self.prefix(), now.format("%Y%m%d%H%M%S")),
        }
    }

    pub fn generate(&self) -> String {
        self.generate_at(Utc::now())
    }
}
