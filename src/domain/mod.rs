//! Pure domain models: transactions, month periods and the category taxonomy.
//! No I/O and no validation policy beyond the types' own invariants.

pub mod period;
pub mod taxonomy;
pub mod transaction;

pub use period::{Period, PeriodError};
pub use taxonomy::{
    is_valid_category, standard_definition, MismatchRule, RuleScope, Taxonomy, TaxonomyDefinition,
    TaxonomyError,
};
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransactionKind, TransactionState,
};
