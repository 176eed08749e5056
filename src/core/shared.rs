//! Thread-safe handle for callers that share one ledger between sessions.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::errors::{NotFound, RejectReason};
use crate::core::ledger_store::{AppendOptions, Appended, LedgerStore, SortOrder};
use crate::core::services::AggregateView;
use crate::domain::{NewTransaction, Period, Transaction, TransactionId};

/// Cloneable handle; every clone serializes access through one mutex.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<LedgerStore>>,
}

impl SharedLedger {
    pub fn new(store: LedgerStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    // Appends and deletes never leave partial state behind, so a poisoned
    // lock still guards a consistent ledger.
    fn lock(&self) -> MutexGuard<'_, LedgerStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(
        &self,
        candidate: NewTransaction,
        options: AppendOptions,
    ) -> Result<Appended, RejectReason> {
        self.lock().append(candidate, options)
    }

    pub fn delete(&self, id: TransactionId) -> Result<AggregateView, NotFound> {
        self.lock().delete(id)
    }

    pub fn snapshot(&self, filter: Option<Period>) -> AggregateView {
        self.lock().snapshot(filter)
    }

    /// Owned copy of the ordered listing, taken under the lock.
    pub fn list(&self, order: SortOrder) -> Vec<Transaction> {
        self.lock().list(order).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Runs `f` with read access to the store while holding the lock.
    pub fn with_store<R>(&self, f: impl FnOnce(&LedgerStore) -> R) -> R {
        f(&self.lock())
    }
}

impl From<LedgerStore> for SharedLedger {
    fn from(store: LedgerStore) -> Self {
        Self::new(store)
    }
}
