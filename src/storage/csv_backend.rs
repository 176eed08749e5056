//! CSV adapter using the `Date, Type, Category, Amount, Description` columns.
//!
//! The format has no id or budget columns: ids are re-issued in file order on
//! load and the budget comes back as `None`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::core::errors::{LedgerError, Result};
use crate::domain::{NewTransaction, Transaction, TransactionId, TransactionKind};
use crate::utils::write_atomic;

use super::{LedgerDocument, StorageBackend};

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Type")]
    kind: TransactionKind,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Amount")]
    amount: Decimal,
    #[serde(rename = "Description", default)]
    description: String,
}

impl From<&Transaction> for CsvRow {
    fn from(txn: &Transaction) -> Self {
        Self {
            date: txn.occurred_on(),
            kind: txn.kind(),
            category: txn.category().to_string(),
            amount: txn.amount(),
            description: txn.description().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvStorage {
    path: PathBuf,
}

impl CsvStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Renders transactions as CSV text with a header row.
pub fn to_csv(transactions: &[Transaction]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for txn in transactions {
        writer.serialize(CsvRow::from(txn))?;
    }
    if transactions.is_empty() {
        writer.write_record(["Date", "Type", "Category", "Amount", "Description"])?;
    }
    writer
        .into_inner()
        .map_err(|err| LedgerError::Storage(err.to_string()))
}

/// Parses CSV text, issuing ids `1..=n` in row order.
pub fn from_csv(data: &[u8]) -> Result<Vec<Transaction>> {
    let mut reader = csv::Reader::from_reader(data);
    let mut transactions = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let candidate = NewTransaction::new(row.kind, row.category, row.amount, row.date)
            .with_description(row.description);
        transactions.push(Transaction::new(
            TransactionId::new(index as u64 + 1),
            candidate,
        ));
    }
    Ok(transactions)
}

impl StorageBackend for CsvStorage {
    fn save(&self, document: &LedgerDocument) -> Result<()> {
        let data = to_csv(&document.transactions)?;
        write_atomic(&self.path, &data)?;
        debug!(path = %self.path.display(), rows = document.transactions.len(), "ledger exported");
        Ok(())
    }

    fn load(&self) -> Result<LedgerDocument> {
        let data = std::fs::read(&self.path)?;
        let transactions = from_csv(&data)?;
        Ok(LedgerDocument {
            ledger_id: Uuid::new_v4(),
            budget: None,
            next_id: transactions.len() as u64 + 1,
            transactions,
        })
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}
