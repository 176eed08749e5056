//! Accept/reject decisions for candidate transactions against balance and budget limits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::errors::RejectReason;
use crate::core::services::Aggregator;
use crate::domain::{is_valid_category, NewTransaction, Period, Transaction, TransactionKind};

/// Which transactions count towards the balance an expense is checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceScope {
    #[default]
    AllTime,
    CandidateMonth,
}

/// Which expenses a ceiling without an explicit period is compared with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CeilingWindow {
    AllTime,
    #[default]
    CandidateMonth,
}

/// Caller-supplied spending limit. Not persisted with the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCeiling {
    pub limit: Decimal,
    /// Explicit month the limit covers; `None` defers to the guard's [`CeilingWindow`].
    pub period: Option<Period>,
}

impl BudgetCeiling {
    pub fn new(limit: Decimal) -> Self {
        Self {
            limit,
            period: None,
        }
    }

    pub fn for_period(limit: Decimal, period: Period) -> Self {
        Self {
            limit,
            period: Some(period),
        }
    }
}

/// Validates candidates before they are committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetGuard {
    balance_scope: BalanceScope,
    budget_window: CeilingWindow,
}

impl BudgetGuard {
    pub fn new(balance_scope: BalanceScope, budget_window: CeilingWindow) -> Self {
        Self {
            balance_scope,
            budget_window,
        }
    }

    pub fn balance_scope(&self) -> BalanceScope {
        self.balance_scope
    }

    pub fn budget_window(&self) -> CeilingWindow {
        self.budget_window
    }

    /// Runs every check in order: amount, category, headroom, balance, budget.
    pub fn validate(
        &self,
        candidate: &NewTransaction,
        current: &[Transaction],
        ceiling: Option<&BudgetCeiling>,
        allow_force: bool,
    ) -> Result<(), RejectReason> {
        Self::check_fields(candidate)?;
        self.check_limits(candidate, current, ceiling, allow_force)
            .map(|_| ())
    }

    /// Boundary checks on the candidate alone.
    pub fn check_fields(candidate: &NewTransaction) -> Result<(), RejectReason> {
        if candidate.amount <= Decimal::ZERO {
            return Err(RejectReason::InvalidAmount {
                amount: candidate.amount,
            });
        }
        if !is_valid_category(&candidate.category) {
            return Err(RejectReason::InvalidCategory {
                category: candidate.category.clone(),
            });
        }
        Ok(())
    }

    /// Balance and budget checks. Income is never limited.
    ///
    /// On success returns the rejections that `allow_force` bypassed, if any.
    pub fn check_limits(
        &self,
        candidate: &NewTransaction,
        current: &[Transaction],
        ceiling: Option<&BudgetCeiling>,
        allow_force: bool,
    ) -> Result<Vec<RejectReason>, RejectReason> {
        Self::check_headroom(candidate, current)?;
        if candidate.kind == TransactionKind::Income {
            return Ok(Vec::new());
        }

        let mut overridden = Vec::new();

        let balance = Aggregator::balance(current, self.balance_filter(candidate));
        if candidate.amount > balance {
            let reason = RejectReason::InsufficientBalance {
                balance,
                amount: candidate.amount,
            };
            debug!(%balance, amount = %candidate.amount, "expense exceeds balance");
            if !allow_force {
                return Err(reason);
            }
            overridden.push(reason);
        }

        if let Some(reason) = self.budget_violation(candidate, current, ceiling) {
            if !allow_force {
                return Err(reason);
            }
            overridden.push(reason);
        }

        for reason in &overridden {
            warn!("force override accepted: {}", reason);
        }
        Ok(overridden)
    }

    /// Rejects a candidate whose amount would push its kind's ledger total past
    /// the largest representable decimal. Every narrower total is bounded by it.
    pub fn check_headroom(
        candidate: &NewTransaction,
        current: &[Transaction],
    ) -> Result<(), RejectReason> {
        let mut total = Decimal::ZERO;
        for txn in current.iter().filter(|txn| txn.kind() == candidate.kind) {
            total = total
                .checked_add(txn.amount())
                .ok_or(RejectReason::InvalidAmount {
                    amount: candidate.amount,
                })?;
        }
        match total.checked_add(candidate.amount) {
            Some(_) => Ok(()),
            None => {
                debug!(%total, amount = %candidate.amount, "amount exceeds ledger headroom");
                Err(RejectReason::InvalidAmount {
                    amount: candidate.amount,
                })
            }
        }
    }

    fn balance_filter(&self, candidate: &NewTransaction) -> Option<Period> {
        match self.balance_scope {
            BalanceScope::AllTime => None,
            BalanceScope::CandidateMonth => Some(Period::containing(candidate.occurred_on)),
        }
    }

    fn budget_violation(
        &self,
        candidate: &NewTransaction,
        current: &[Transaction],
        ceiling: Option<&BudgetCeiling>,
    ) -> Option<RejectReason> {
        let ceiling = ceiling.filter(|ceiling| ceiling.limit > Decimal::ZERO)?;
        let filter = match (ceiling.period, self.budget_window) {
            (Some(period), _) if !period.contains(candidate.occurred_on) => return None,
            (Some(period), _) => Some(period),
            (None, CeilingWindow::CandidateMonth) => Some(Period::containing(candidate.occurred_on)),
            (None, CeilingWindow::AllTime) => None,
        };

        let current_spend = Aggregator::total(current, TransactionKind::Expense, filter);
        let projected = current_spend + candidate.amount;
        debug!(
            ceiling = %ceiling.limit,
            current = %current_spend,
            %projected,
            "checked budget ceiling"
        );
        (projected > ceiling.limit).then(|| RejectReason::BudgetExceeded {
            ceiling: ceiling.limit,
            current: current_spend,
            projected,
        })
    }
}
