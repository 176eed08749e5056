//! Transaction records and the candidates submitted for insertion.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Surrogate key assigned by the ledger at insertion. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction of money flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Income, TransactionKind::Expense];

    /// The kind whose vocabulary is considered foreign to this one.
    pub fn opposite(self) -> Self {
        match self {
            TransactionKind::Income => TransactionKind::Expense,
            TransactionKind::Expense => TransactionKind::Income,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("unknown transaction type `{}`", other)),
        }
    }
}

/// Lifecycle of a ledger entry. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    Active,
    Deleted,
}

/// A candidate transaction, already parsed by the caller, awaiting validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub occurred_on: NaiveDate,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        category: impl Into<String>,
        amount: Decimal,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            occurred_on,
            kind,
            category: category.into(),
            amount,
            description: String::new(),
        }
    }

    pub fn income(category: impl Into<String>, amount: Decimal, occurred_on: NaiveDate) -> Self {
        Self::new(TransactionKind::Income, category, amount, occurred_on)
    }

    pub fn expense(category: impl Into<String>, amount: Decimal, occurred_on: NaiveDate) -> Self {
        Self::new(TransactionKind::Expense, category, amount, occurred_on)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A committed ledger entry. Fields are read-only; corrections are made by
/// deleting the entry and appending a replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    #[serde(rename = "date")]
    occurred_on: NaiveDate,
    #[serde(rename = "type")]
    kind: TransactionKind,
    #[serde(deserialize_with = "trimmed")]
    category: String,
    amount: Decimal,
    #[serde(default)]
    description: String,
}

impl Transaction {
    pub fn new(id: TransactionId, candidate: NewTransaction) -> Self {
        Self {
            id,
            occurred_on: candidate.occurred_on,
            kind: candidate.kind,
            category: candidate.category.trim().to_string(),
            amount: candidate.amount,
            description: candidate.description,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn occurred_on(&self) -> NaiveDate {
        self.occurred_on
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Signed contribution to the balance: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Persisted rows get the same category normalization as appended ones.
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}
