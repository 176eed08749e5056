//! Adapters for the persistence collaborator. The ledger store never calls
//! these itself; callers persist after a successful append or delete.

pub mod csv_backend;
pub mod json_backend;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::errors::Result;
use crate::domain::Transaction;

pub use csv_backend::CsvStorage;
pub use json_backend::JsonStorage;

/// Serializable ledger image: `{ "budget": ..., "transactions": [...] }` plus
/// the bookkeeping needed to keep ids unique across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default = "Uuid::new_v4")]
    pub ledger_id: Uuid,
    #[serde(default)]
    pub budget: Option<Decimal>,
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Default for LedgerDocument {
    fn default() -> Self {
        Self {
            ledger_id: Uuid::new_v4(),
            budget: None,
            next_id: 1,
            transactions: Vec::new(),
        }
    }
}

/// Abstraction over persistence backends capable of storing a ledger document.
pub trait StorageBackend: Send + Sync {
    fn save(&self, document: &LedgerDocument) -> Result<()>;

    fn load(&self) -> Result<LedgerDocument>;

    fn exists(&self) -> bool;
}
