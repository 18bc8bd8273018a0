//! Error types for ledgerdesk-core
//!
//! Form and money errors surface to users as banners, so every variant
//! carries a message that reads well on its own.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// One or more form fields failed validation
    ValidationError,
    /// Amount could not be parsed or was not positive
    InvalidAmount,
    /// Source balance cannot cover the amount
    InsufficientBalance,
    /// Local persistence failure
    StorageError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidAmount => write!(f, "INVALID_AMOUNT"),
            ErrorCode::InsufficientBalance => write!(f, "INSUFFICIENT_BALANCE"),
            ErrorCode::StorageError => write!(f, "STORAGE_ERROR"),
        }
    }
}

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Warning,
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// A single failed form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            fields: vec![],
            suggestions: vec![],
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldError>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("{}", summarize(.fields))]
    Validation { fields: Vec<FieldError> },

    #[error("Please enter a valid amount")]
    InvalidAmount { input: String },

    #[error("Insufficient balance in source wallet")]
    InsufficientBalance { available: i64, requested: i64 },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

fn summarize(fields: &[FieldError]) -> String {
    match fields {
        [] => "Validation failed".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

impl CoreError {
    /// Shorthand for a single-field validation failure
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        CoreError::Validation {
            fields: vec![FieldError::new(field, message)],
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            CoreError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            CoreError::Storage { .. } => ErrorCode::StorageError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Storage { .. } => ErrorSeverity::Error,
            _ => ErrorSeverity::Warning,
        }
    }

    /// Field errors, empty unless this is a validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            CoreError::Validation { fields } => fields,
            _ => &[],
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());
        match self {
            CoreError::Validation { fields } => details.with_fields(fields.clone()),
            CoreError::InvalidAmount { input } => details.with_suggestion(format!(
                "'{}' is not a positive number; use a value such as 10.50",
                input
            )),
            CoreError::InsufficientBalance { available, .. } => details.with_suggestion(format!(
                "Available: {}",
                crate::money::format_minor(*available)
            )),
            CoreError::Storage { .. } => details,
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;
