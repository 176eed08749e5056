pub mod aggregator;
pub mod budget_guard;
pub mod classifier;

pub use aggregator::{AggregateView, Aggregator, CategoryTotal, DailyTotals};
pub use budget_guard::{BalanceScope, BudgetCeiling, BudgetGuard, CeilingWindow};
pub use classifier::{
    similarity, CategoryMatch, Classifier, FuzzyClassifier, KeywordClassifier, KeywordMatching,
    Verdict,
};

#[cfg(test)]
mod tests;
