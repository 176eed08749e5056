//! Provides income/expense aggregation over transaction slices.
//!
//! Every call recomputes from scratch so totals always match the rows passed in.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Period, Transaction, TransactionKind};

/// Totals for a set of transactions, optionally restricted to one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateView {
    pub period: Option<Period>,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub balance: Decimal,
    pub income_by_category: BTreeMap<String, Decimal>,
    pub expense_by_category: BTreeMap<String, Decimal>,
    pub transaction_count: usize,
}

impl AggregateView {
    /// Per-category totals for one kind.
    pub fn by_category(&self, kind: TransactionKind) -> &BTreeMap<String, Decimal> {
        match kind {
            TransactionKind::Income => &self.income_by_category,
            TransactionKind::Expense => &self.expense_by_category,
        }
    }
}

/// One bar of a category chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
    /// Share of the kind total in percent, rounded to two places.
    pub share_percent: Decimal,
}

/// Income and expense booked on one calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub income: Decimal,
    pub expense: Decimal,
}

/// Stateless aggregation utilities.
pub struct Aggregator;

impl Aggregator {
    pub fn aggregate(transactions: &[Transaction], filter: Option<Period>) -> AggregateView {
        let mut view = AggregateView {
            period: filter,
            income_total: Decimal::ZERO,
            expense_total: Decimal::ZERO,
            balance: Decimal::ZERO,
            income_by_category: BTreeMap::new(),
            expense_by_category: BTreeMap::new(),
            transaction_count: 0,
        };

        for txn in in_period(transactions, filter) {
            let (total, by_category) = match txn.kind() {
                TransactionKind::Income => (&mut view.income_total, &mut view.income_by_category),
                TransactionKind::Expense => {
                    (&mut view.expense_total, &mut view.expense_by_category)
                }
            };
            *total += txn.amount();
            *by_category
                .entry(txn.category().to_string())
                .or_insert(Decimal::ZERO) += txn.amount();
            view.transaction_count += 1;
        }

        view.balance = view.income_total - view.expense_total;
        view
    }

    /// Income total minus expense total.
    pub fn balance(transactions: &[Transaction], filter: Option<Period>) -> Decimal {
        in_period(transactions, filter)
            .map(Transaction::signed_amount)
            .sum()
    }

    /// Sum of amounts for one kind.
    pub fn total(
        transactions: &[Transaction],
        kind: TransactionKind,
        filter: Option<Period>,
    ) -> Decimal {
        in_period(transactions, filter)
            .filter(|txn| txn.kind() == kind)
            .map(Transaction::amount)
            .sum()
    }

    /// Category totals for a single kind.
    pub fn by_category(
        transactions: &[Transaction],
        kind: TransactionKind,
        filter: Option<Period>,
    ) -> BTreeMap<String, Decimal> {
        let mut totals = BTreeMap::new();
        for txn in in_period(transactions, filter).filter(|txn| txn.kind() == kind) {
            *totals
                .entry(txn.category().to_string())
                .or_insert(Decimal::ZERO) += txn.amount();
        }
        totals
    }

    /// Category totals sorted by amount descending, ties by name.
    pub fn ranked_by_category(
        transactions: &[Transaction],
        kind: TransactionKind,
        filter: Option<Period>,
    ) -> Vec<CategoryTotal> {
        let totals = Self::by_category(transactions, kind, filter);
        let grand_total: Decimal = totals.values().copied().sum();
        let mut ranked: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, amount)| CategoryTotal {
                share_percent: share_of(amount, grand_total),
                category,
                amount,
            })
            .collect();
        ranked.sort_by(|a, b| match b.amount.cmp(&a.amount) {
            Ordering::Equal => a.category.cmp(&b.category),
            other => other,
        });
        ranked
    }

    /// Income and expense per calendar date, oldest first.
    pub fn timeline(
        transactions: &[Transaction],
        filter: Option<Period>,
    ) -> BTreeMap<NaiveDate, DailyTotals> {
        let mut days: BTreeMap<NaiveDate, DailyTotals> = BTreeMap::new();
        for txn in in_period(transactions, filter) {
            let day = days.entry(txn.occurred_on()).or_default();
            match txn.kind() {
                TransactionKind::Income => day.income += txn.amount(),
                TransactionKind::Expense => day.expense += txn.amount(),
            }
        }
        days
    }
}

fn in_period(
    transactions: &[Transaction],
    filter: Option<Period>,
) -> impl Iterator<Item = &Transaction> {
    transactions
        .iter()
        .filter(move |txn| Period::matches(filter, txn.occurred_on()))
}

fn share_of(amount: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    // Divide first: the ratio is at most one, so scaling it cannot overflow.
    (amount / total * Decimal::ONE_HUNDRED).round_dp(2)
}
