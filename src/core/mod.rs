pub mod errors;
pub mod ledger_store;
pub mod services;
pub mod shared;

pub use errors::{LedgerError, NotFound, RejectReason, Result};
pub use ledger_store::{AppendOptions, Appended, LedgerStore, SortOrder};
pub use shared::SharedLedger;
