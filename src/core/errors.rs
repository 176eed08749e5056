use std::result::Result as StdResult;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{PeriodError, TaxonomyError, TransactionId};

/// Why a candidate transaction was not committed. Every variant is user-correctable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("amount {amount} must be greater than zero and keep ledger totals representable")]
    InvalidAmount { amount: Decimal },
    #[error("category `{category}` is empty or contains digits")]
    InvalidCategory { category: String },
    #[error("insufficient balance: expense of {amount} exceeds balance of {balance}")]
    InsufficientBalance { balance: Decimal, amount: Decimal },
    #[error(
        "budget exceeded: ceiling {ceiling}, current spend {current}, projected spend {projected}"
    )]
    BudgetExceeded {
        ceiling: Decimal,
        current: Decimal,
        projected: Decimal,
    },
    #[error("description mentions `{term}`, which conflicts with the chosen type or category")]
    CategoryMismatch { term: String },
    #[error("category `{input}` is not recognized")]
    UnrecognizedCategory {
        input: String,
        closest: Option<String>,
    },
    #[error("ledger has issued every available transaction id")]
    IdsExhausted,
}

impl RejectReason {
    /// Balance and budget rejections can be bypassed with an explicit force override.
    pub fn is_overridable(&self) -> bool {
        matches!(
            self,
            RejectReason::InsufficientBalance { .. } | RejectReason::BudgetExceeded { .. }
        )
    }
}

/// Delete referenced an id that is not active in the ledger.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("transaction {0} not found")]
pub struct NotFound(pub TransactionId);

/// Unified error type for the store, storage adapters and configuration.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Rejected(#[from] RejectReason),
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Invalid taxonomy: {0}")]
    Taxonomy(#[from] TaxonomyError),
    #[error("Invalid period: {0}")]
    Period(#[from] PeriodError),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, LedgerError>;

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}
