//! Error types for Mercura

use crate::types::MerchandiseId;
use thiserror::Error;

/// Main error type for Mercura
#[derive(Error, Debug)]
pub enum LedgerError {
    // ============ Input Errors ============
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("merchandise {0} not found")]
    NotFound(MerchandiseId),

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    // ============ Engine Errors ============
    #[error("statement failed: {0}")]
    Statement(String),

    // ============ Persistence Errors ============
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("durable write rejected: {0}")]
    PersistenceWrite(String),

    #[error("startup timed out: {0}")]
    StartupTimeout(String),

    // ============ General Errors ============
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedgerError {
    /// Field-tagged validation failure.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        LedgerError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// True for errors caused by bad user input or a business-rule miss.
    /// These are returned for inline display and never logged as system
    /// failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            LedgerError::Validation { .. }
                | LedgerError::NotFound(_)
                | LedgerError::InsufficientStock { .. }
        )
    }
}

/// Result type for Mercura operations
pub type LedgerResult<T> = Result<T, LedgerError>;
