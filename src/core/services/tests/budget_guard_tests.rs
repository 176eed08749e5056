use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core::errors::RejectReason;
use crate::core::services::{BalanceScope, BudgetCeiling, BudgetGuard, CeilingWindow};
use crate::domain::{NewTransaction, Period, Transaction, TransactionId};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn committed(candidates: Vec<NewTransaction>) -> Vec<Transaction> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| {
            Transaction::new(TransactionId::new(index as u64 + 1), candidate)
        })
        .collect()
}

fn funded_march() -> Vec<Transaction> {
    committed(vec![
        NewTransaction::income("Salary", Decimal::from(5000), date(2024, 3, 1)),
        NewTransaction::expense("Rent", Decimal::from(1200), date(2024, 3, 2)),
        NewTransaction::expense("Food", Decimal::from(600), date(2024, 3, 5)),
        NewTransaction::expense("Food", Decimal::from(900), date(2024, 2, 20)),
    ])
}

#[test]
fn rejects_zero_and_negative_amounts() {
    let guard = BudgetGuard::default();
    for amount in [Decimal::ZERO, Decimal::from(-5)] {
        let candidate = NewTransaction::income("Salary", amount, date(2024, 1, 1));
        assert_eq!(
            guard.validate(&candidate, &[], None, false),
            Err(RejectReason::InvalidAmount { amount })
        );
    }
}

#[test]
fn rejects_blank_or_digit_categories() {
    let guard = BudgetGuard::default();
    for category in ["", "   ", "Food2", "123", "Food٣", "Rent²"] {
        let candidate = NewTransaction::income(category, Decimal::ONE, date(2024, 1, 1));
        assert_eq!(
            guard.validate(&candidate, &[], None, true),
            Err(RejectReason::InvalidCategory {
                category: category.to_string()
            })
        );
    }
}

#[test]
fn amount_is_checked_before_category() {
    let candidate = NewTransaction::expense("", Decimal::ZERO, date(2024, 1, 1));
    assert!(matches!(
        BudgetGuard::check_fields(&candidate),
        Err(RejectReason::InvalidAmount { .. })
    ));
}

#[test]
fn first_expense_on_empty_ledger_is_rejected() {
    let guard = BudgetGuard::default();
    let candidate = NewTransaction::expense("Food", Decimal::ONE, date(2024, 1, 1));
    assert_eq!(
        guard.validate(&candidate, &[], None, false),
        Err(RejectReason::InsufficientBalance {
            balance: Decimal::ZERO,
            amount: Decimal::ONE
        })
    );
}

#[test]
fn income_skips_balance_and_budget_checks() {
    let guard = BudgetGuard::default();
    let candidate = NewTransaction::income("Gifts", Decimal::from(10_000), date(2024, 3, 9));
    let ceiling = BudgetCeiling::new(Decimal::ONE);
    assert_eq!(guard.validate(&candidate, &[], Some(&ceiling), false), Ok(()));
}

#[test]
fn expense_equal_to_balance_is_accepted() {
    let guard = BudgetGuard::default();
    let rows = funded_march();
    let candidate = NewTransaction::expense("Other", Decimal::from(2300), date(2024, 3, 20));
    assert_eq!(guard.validate(&candidate, &rows, None, false), Ok(()));
}

#[test]
fn candidate_month_balance_scope_ignores_other_months() {
    let guard = BudgetGuard::new(BalanceScope::CandidateMonth, CeilingWindow::CandidateMonth);
    let rows = funded_march();
    // All-time balance is 2300 but March alone holds 3200.
    let candidate = NewTransaction::expense("Other", Decimal::from(3000), date(2024, 3, 20));
    assert_eq!(guard.validate(&candidate, &rows, None, false), Ok(()));
    assert!(BudgetGuard::default()
        .validate(&candidate, &rows, None, false)
        .is_err());
}

#[test]
fn budget_rejection_reports_ceiling_current_and_projected() {
    let guard = BudgetGuard::default();
    let rows = funded_march();
    let ceiling = BudgetCeiling::new(Decimal::from(2000));
    let candidate = NewTransaction::expense("Shopping", Decimal::from(500), date(2024, 3, 21));
    assert_eq!(
        guard.validate(&candidate, &rows, Some(&ceiling), false),
        Err(RejectReason::BudgetExceeded {
            ceiling: Decimal::from(2000),
            current: Decimal::from(1800),
            projected: Decimal::from(2300),
        })
    );
}

#[test]
fn all_time_window_counts_every_expense() {
    let guard = BudgetGuard::new(BalanceScope::AllTime, CeilingWindow::AllTime);
    let rows = funded_march();
    let ceiling = BudgetCeiling::new(Decimal::from(3000));
    let candidate = NewTransaction::expense("Food", Decimal::from(400), date(2024, 3, 21));
    assert_eq!(
        guard.validate(&candidate, &rows, Some(&ceiling), false),
        Err(RejectReason::BudgetExceeded {
            ceiling: Decimal::from(3000),
            current: Decimal::from(2700),
            projected: Decimal::from(3100),
        })
    );
}

#[test]
fn explicit_period_ceiling_skips_candidates_outside_it() {
    let guard = BudgetGuard::default();
    let rows = funded_march();
    let february = Period::new(2, 2024).unwrap();
    let ceiling = BudgetCeiling::for_period(Decimal::from(100), february);
    let march = NewTransaction::expense("Food", Decimal::from(50), date(2024, 3, 22));
    assert_eq!(guard.validate(&march, &rows, Some(&ceiling), false), Ok(()));

    let late_february = NewTransaction::expense("Food", Decimal::from(50), date(2024, 2, 28));
    assert!(matches!(
        guard.validate(&late_february, &rows, Some(&ceiling), false),
        Err(RejectReason::BudgetExceeded { .. })
    ));
}

#[test]
fn non_positive_ceiling_is_ignored() {
    let guard = BudgetGuard::default();
    let rows = funded_march();
    let candidate = NewTransaction::expense("Food", Decimal::from(10), date(2024, 3, 22));
    let zero = BudgetCeiling::new(Decimal::ZERO);
    assert_eq!(guard.validate(&candidate, &rows, Some(&zero), false), Ok(()));
}

#[test]
fn force_override_bypasses_and_reports_both_limits() {
    let guard = BudgetGuard::default();
    let rows = funded_march();
    let ceiling = BudgetCeiling::new(Decimal::from(2000));
    let candidate = NewTransaction::expense("Other", Decimal::from(2500), date(2024, 3, 25));
    let overridden = guard
        .check_limits(&candidate, &rows, Some(&ceiling), true)
        .expect("force accepts");
    assert_eq!(overridden.len(), 2);
    assert!(matches!(overridden[0], RejectReason::InsufficientBalance { .. }));
    assert!(matches!(overridden[1], RejectReason::BudgetExceeded { .. }));
}

#[test]
fn force_does_not_bypass_field_checks() {
    let guard = BudgetGuard::default();
    let candidate = NewTransaction::expense("Food", Decimal::from(-1), date(2024, 3, 25));
    assert!(guard.validate(&candidate, &[], None, true).is_err());
}

#[test]
fn headroom_rejects_totals_past_the_decimal_range() {
    let rows = committed(vec![NewTransaction::income(
        "Salary",
        Decimal::MAX,
        date(2024, 3, 1),
    )]);
    let more_income = NewTransaction::income("Gifts", Decimal::ONE, date(2024, 3, 2));
    assert_eq!(
        BudgetGuard::check_headroom(&more_income, &rows),
        Err(RejectReason::InvalidAmount {
            amount: Decimal::ONE
        })
    );
    assert_eq!(
        BudgetGuard::default().validate(&more_income, &rows, None, true),
        Err(RejectReason::InvalidAmount {
            amount: Decimal::ONE
        })
    );

    let expense = NewTransaction::expense("Rent", Decimal::MAX, date(2024, 3, 3));
    assert_eq!(BudgetGuard::check_headroom(&expense, &rows), Ok(()));
}
