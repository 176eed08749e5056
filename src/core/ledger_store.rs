//! The ledger store: owns the transaction sequence and gates every append
//! through the classifier and the budget guard.

use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{EngineConfig, MismatchPolicy};
use crate::core::errors::{LedgerError, NotFound, RejectReason, Result};
use crate::core::services::{
    AggregateView, Aggregator, BudgetCeiling, BudgetGuard, Classifier, Verdict,
};
use crate::domain::{
    is_valid_category, NewTransaction, Period, Transaction, TransactionId, TransactionKind,
    TransactionState,
};
use crate::storage::LedgerDocument;

/// Per-call options for [`LedgerStore::append`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOptions {
    pub ceiling: Option<BudgetCeiling>,
    /// Commit despite balance or budget rejections.
    pub allow_force: bool,
}

impl AppendOptions {
    pub fn forced() -> Self {
        Self {
            ceiling: None,
            allow_force: true,
        }
    }

    pub fn with_ceiling(mut self, ceiling: BudgetCeiling) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    pub fn force(mut self, allow_force: bool) -> Self {
        self.allow_force = allow_force;
        self
    }
}

/// Result of a committed append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    pub id: TransactionId,
    /// Whole-ledger totals after the append.
    pub snapshot: AggregateView,
    /// Classifier findings committed under [`MismatchPolicy::WarnOnly`].
    pub warnings: Vec<RejectReason>,
    /// Balance or budget rejections bypassed by the force override.
    pub overridden: Vec<RejectReason>,
}

/// Ordering for [`LedgerStore::list`]. Ties keep insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    DateDescending,
    DateAscending,
    Insertion,
    AmountDescending,
}

pub struct LedgerStore {
    ledger_id: Uuid,
    transactions: Vec<Transaction>,
    next_id: u64,
    mismatch_policy: MismatchPolicy,
    guard: BudgetGuard,
    classifier: Box<dyn Classifier>,
}

impl LedgerStore {
    /// Creates an empty ledger, validating the configured taxonomy.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let classifier = config.classifier()?;
        Ok(Self::with_classifier(config, classifier))
    }

    /// Creates an empty ledger around a caller-provided classifier.
    pub fn with_classifier(config: &EngineConfig, classifier: Box<dyn Classifier>) -> Self {
        Self {
            ledger_id: Uuid::new_v4(),
            transactions: Vec::new(),
            next_id: 1,
            mismatch_policy: config.mismatch_policy,
            guard: config.guard(),
            classifier,
        }
    }

    /// Rebuilds a ledger from a persisted document. Rows are not re-run through
    /// the guard, but each must still satisfy the transaction invariants.
    pub fn restore(config: &EngineConfig, document: LedgerDocument) -> Result<Self> {
        let mut store = Self::new(config)?;
        let mut seen = HashSet::new();
        let mut floor = 1u64;
        let mut income_total = Decimal::ZERO;
        let mut expense_total = Decimal::ZERO;
        for txn in &document.transactions {
            if txn.amount() <= Decimal::ZERO {
                return Err(LedgerError::InvalidRecord(format!(
                    "transaction {} has non-positive amount {}",
                    txn.id(),
                    txn.amount()
                )));
            }
            if !is_valid_category(txn.category()) {
                return Err(LedgerError::InvalidRecord(format!(
                    "transaction {} has invalid category `{}`",
                    txn.id(),
                    txn.category()
                )));
            }
            // Id 0 is never issued and u64::MAX leaves no room for a successor.
            let following = Some(txn.id().value())
                .filter(|raw| *raw > 0)
                .and_then(|raw| raw.checked_add(1))
                .ok_or_else(|| {
                    LedgerError::InvalidRecord(format!(
                        "transaction id {} is out of range",
                        txn.id()
                    ))
                })?;
            floor = floor.max(following);
            if !seen.insert(txn.id()) {
                return Err(LedgerError::InvalidRecord(format!(
                    "transaction id {} appears more than once",
                    txn.id()
                )));
            }
            let total = match txn.kind() {
                TransactionKind::Income => &mut income_total,
                TransactionKind::Expense => &mut expense_total,
            };
            *total = total.checked_add(txn.amount()).ok_or_else(|| {
                LedgerError::InvalidRecord(format!(
                    "{} total overflows at transaction {}",
                    txn.kind(),
                    txn.id()
                ))
            })?;
        }

        if document.next_id < floor {
            warn!(
                recorded = document.next_id,
                repaired = floor,
                "restored ledger had a stale next id"
            );
        }
        store.next_id = document.next_id.max(floor);
        store.ledger_id = document.ledger_id;
        store.transactions = document.transactions;
        info!(
            ledger = %store.ledger_id,
            transactions = store.transactions.len(),
            "ledger restored"
        );
        Ok(store)
    }

    /// Validates and commits a candidate.
    ///
    /// Field checks run first, then the classifier, then the headroom, balance
    /// and budget checks, so a category mismatch is reported ahead of a budget
    /// rejection. A rejected candidate leaves the ledger untouched.
    pub fn append(
        &mut self,
        candidate: NewTransaction,
        options: AppendOptions,
    ) -> std::result::Result<Appended, RejectReason> {
        BudgetGuard::check_fields(&candidate)?;

        let verdict = self.classifier.classify(
            candidate.kind,
            &candidate.category,
            &candidate.description,
        );
        debug!(classifier = self.classifier.name(), ?verdict, "classified candidate");

        let (category, finding) = match verdict {
            Verdict::Match { category } => (category, None),
            Verdict::Mismatch { term } => (
                candidate.category.trim().to_string(),
                Some(RejectReason::CategoryMismatch { term }),
            ),
            Verdict::Unrecognized { input, closest } => (
                candidate.category.trim().to_string(),
                Some(RejectReason::UnrecognizedCategory {
                    input,
                    closest: closest.map(|found| found.category),
                }),
            ),
        };

        let mut warnings = Vec::new();
        if let Some(reason) = finding {
            match self.mismatch_policy {
                MismatchPolicy::Block => return Err(reason),
                MismatchPolicy::WarnOnly => {
                    warn!("committing despite classifier finding: {}", reason);
                    warnings.push(reason);
                }
            }
        }

        let overridden = self.guard.check_limits(
            &candidate,
            &self.transactions,
            options.ceiling.as_ref(),
            options.allow_force,
        )?;

        let following = self
            .next_id
            .checked_add(1)
            .ok_or(RejectReason::IdsExhausted)?;
        let id = TransactionId::new(self.next_id);
        self.next_id = following;
        let txn = Transaction::new(
            id,
            NewTransaction {
                category,
                ..candidate
            },
        );
        info!(
            %id,
            kind = %txn.kind(),
            amount = %txn.amount(),
            category = txn.category(),
            "transaction appended"
        );
        self.transactions.push(txn);

        Ok(Appended {
            id,
            snapshot: self.snapshot(None),
            warnings,
            overridden,
        })
    }

    /// Removes the transaction with `id` and returns fresh whole-ledger totals.
    pub fn delete(&mut self, id: TransactionId) -> std::result::Result<AggregateView, NotFound> {
        let index = self
            .transactions
            .iter()
            .position(|txn| txn.id() == id)
            .ok_or(NotFound(id))?;
        let removed = self.transactions.remove(index);
        info!(
            %id,
            kind = %removed.kind(),
            amount = %removed.amount(),
            "transaction deleted"
        );
        Ok(self.snapshot(None))
    }

    pub fn snapshot(&self, filter: Option<Period>) -> AggregateView {
        Aggregator::aggregate(&self.transactions, filter)
    }

    /// Ordered view over the active transactions. Each call starts from scratch.
    pub fn list(&self, order: SortOrder) -> impl ExactSizeIterator<Item = &Transaction> + '_ {
        let mut rows: Vec<&Transaction> = self.transactions.iter().collect();
        match order {
            SortOrder::DateDescending => {
                rows.sort_by(|a, b| b.occurred_on().cmp(&a.occurred_on()))
            }
            SortOrder::DateAscending => rows.sort_by_key(|txn| txn.occurred_on()),
            SortOrder::Insertion => {}
            SortOrder::AmountDescending => rows.sort_by(|a, b| b.amount().cmp(&a.amount())),
        }
        rows.into_iter()
    }

    /// Active transactions in insertion order, suitable for serialization.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id() == id)
    }

    /// `None` for ids this ledger never issued.
    pub fn state(&self, id: TransactionId) -> Option<TransactionState> {
        if self.get(id).is_some() {
            Some(TransactionState::Active)
        } else if id.value() >= 1 && id.value() < self.next_id {
            Some(TransactionState::Deleted)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn ledger_id(&self) -> Uuid {
        self.ledger_id
    }

    pub fn next_id(&self) -> TransactionId {
        TransactionId::new(self.next_id)
    }

    pub fn mismatch_policy(&self) -> MismatchPolicy {
        self.mismatch_policy
    }

    pub fn guard(&self) -> &BudgetGuard {
        &self.guard
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Snapshot of the ledger for the persistence collaborator.
    pub fn to_document(&self, budget: Option<Decimal>) -> LedgerDocument {
        LedgerDocument {
            ledger_id: self.ledger_id,
            budget,
            next_id: self.next_id,
            transactions: self.transactions.clone(),
        }
    }
}

impl fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerStore")
            .field("ledger_id", &self.ledger_id)
            .field("transactions", &self.transactions.len())
            .field("next_id", &self.next_id)
            .field("mismatch_policy", &self.mismatch_policy)
            .field("guard", &self.guard)
            .field("classifier", &self.classifier.name())
            .finish()
    }
}
