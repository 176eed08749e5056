#![doc(test(attr(deny(warnings))))]

//! Ledger Core keeps a validated income/expense ledger: every append is
//! classified against a category taxonomy and checked against the running
//! balance and an optional monthly budget ceiling before it is committed.
//!
//! ```
//! use chrono::NaiveDate;
//! use ledger_core::{AppendOptions, EngineConfig, LedgerStore, NewTransaction};
//! use rust_decimal::Decimal;
//!
//! let mut store = LedgerStore::new(&EngineConfig::default()).unwrap();
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! store
//!     .append(NewTransaction::income("Salary", Decimal::from(5000), day), AppendOptions::default())
//!     .unwrap();
//! assert_eq!(store.snapshot(None).balance, Decimal::from(5000));
//! ```

pub mod config;
pub mod core;
pub mod domain;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use crate::config::{ClassifierConfig, ClassifierStrategy, EngineConfig, MismatchPolicy};
pub use crate::core::services::{
    AggregateView, Aggregator, BudgetCeiling, BudgetGuard, Classifier, FuzzyClassifier,
    KeywordClassifier, Verdict,
};
pub use crate::core::{
    AppendOptions, Appended, LedgerError, LedgerStore, NotFound, RejectReason, SharedLedger,
    SortOrder,
};
pub use crate::domain::{
    NewTransaction, Period, Taxonomy, Transaction, TransactionId, TransactionKind,
};
pub use crate::storage::{CsvStorage, JsonStorage, LedgerDocument, StorageBackend};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}
