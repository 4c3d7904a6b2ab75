#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use super::*;
use crate::db::Database;

fn spending(entries: &[(Category, Decimal)]) -> BTreeMap<Category, Decimal> {
    entries.iter().copied().collect()
}

// ── load / defaults ───────────────────────────────────────────

#[test]
fn test_defaults_when_nothing_stored() {
    let db = Database::open_in_memory().unwrap();
    let budget = BudgetLimits::load(&db);
    assert_eq!(budget.limits().len(), 4);
    assert_eq!(budget.limit(Category::Food), dec!(3000));
    assert_eq!(budget.limit(Category::Transport), dec!(1500));
    assert_eq!(budget.limit(Category::Entertainment), dec!(2000));
    assert_eq!(budget.limit(Category::Other), dec!(1000));
}

#[test]
fn test_partial_table_is_filled_from_defaults() {
    let db = Database::open_in_memory().unwrap();
    db.put_value(BUDGET_KEY, r#"{"Food": 4200, "Transport": 0, "Pets": 50}"#)
        .unwrap();
    let budget = BudgetLimits::load(&db);
    assert_eq!(budget.limit(Category::Food), dec!(4200));
    assert_eq!(budget.limit(Category::Transport), dec!(1500));
    assert_eq!(budget.limit(Category::Other), dec!(1000));
    assert_eq!(budget.limits().len(), 4);
}

#[test]
fn test_corrupt_table_falls_back() {
    let db = Database::open_in_memory().unwrap();
    db.put_value(BUDGET_KEY, "[1,2").unwrap();
    assert_eq!(BudgetLimits::load(&db).limit(Category::Food), dec!(3000));
}

#[test]
fn test_unreadable_limit_does_not_reset_the_others() {
    let db = Database::open_in_memory().unwrap();
    db.put_value(BUDGET_KEY, r#"{"Food":"4500","Transport":"lots","Other":250}"#)
        .unwrap();
    let budget = BudgetLimits::load(&db);
    assert_eq!(budget.limit(Category::Food), dec!(4500));
    assert_eq!(budget.limit(Category::Transport), dec!(1500));
    assert_eq!(budget.limit(Category::Other), dec!(250));
}

// ── set_limit / reset ─────────────────────────────────────────

#[test]
fn test_set_limit_persists() {
    let db = Database::open_in_memory().unwrap();
    let mut budget = BudgetLimits::load(&db);
    budget.set_limit(Category::Entertainment, dec!(750.50)).unwrap();
    assert_eq!(budget.limit(Category::Entertainment), dec!(750.50));
    assert_eq!(
        BudgetLimits::load(&db).limit(Category::Entertainment),
        dec!(750.50)
    );
}

#[test]
fn test_set_limit_rejects_non_positive() {
    let db = Database::open_in_memory().unwrap();
    let mut budget = BudgetLimits::load(&db);
    assert_eq!(
        budget.set_limit(Category::Food, Decimal::ZERO),
        Err(ValidationError::NonPositiveLimit(Decimal::ZERO))
    );
    assert!(budget.set_limit(Category::Food, dec!(-10)).is_err());
    assert_eq!(budget.limit(Category::Food), dec!(3000));
}

#[test]
fn test_reset_to_defaults() {
    let db = Database::open_in_memory().unwrap();
    let mut budget = BudgetLimits::load(&db);
    budget.set_limit(Category::Food, dec!(1)).unwrap();
    budget.set_limit(Category::Other, dec!(2)).unwrap();
    budget.reset_to_defaults();
    assert_eq!(budget.limit(Category::Food), dec!(3000));
    assert_eq!(BudgetLimits::load(&db).limit(Category::Other), dec!(1000));
}

// ── status ────────────────────────────────────────────────────

#[test]
fn test_status_exceeded_scenario() {
    let db = Database::open_in_memory().unwrap();
    let budget = BudgetLimits::load(&db);
    let status = budget.status(Category::Food, dec!(3500));
    assert_eq!(
        status,
        BudgetStatus {
            spent: dec!(3500),
            limit: dec!(3000),
            remaining: Decimal::ZERO,
            percentage: dec!(100),
            is_exceeded: true,
        }
    );
}

#[test]
fn test_status_under_limit() {
    let db = Database::open_in_memory().unwrap();
    let budget = BudgetLimits::load(&db);
    let status = budget.status(Category::Transport, dec!(375));
    assert_eq!(status.remaining, dec!(1125));
    assert_eq!(status.percentage, dec!(25));
    assert!(!status.is_exceeded);
}

#[test]
fn test_status_exactly_at_limit_is_not_exceeded() {
    let db = Database::open_in_memory().unwrap();
    let budget = BudgetLimits::load(&db);
    let status = budget.status(Category::Other, dec!(1000));
    assert_eq!(status.percentage, dec!(100));
    assert_eq!(status.remaining, Decimal::ZERO);
    assert!(!status.is_exceeded);

    let status = budget.status(Category::Other, dec!(1000.01));
    assert_eq!(status.percentage, dec!(100));
    assert!(status.is_exceeded);
}

#[test]
fn test_status_with_tiny_limit_caps_percentage() {
    let db = Database::open_in_memory().unwrap();
    let mut budget = BudgetLimits::load(&db);
    budget
        .set_limit(Category::Food, dec!(0.0000000000000000000000001))
        .unwrap();

    let status = budget.status(Category::Food, dec!(1000));
    assert!(status.is_exceeded);
    assert_eq!(status.percentage, dec!(100));
    assert_eq!(status.remaining, Decimal::ZERO);
}

// ── summary ───────────────────────────────────────────────────

#[test]
fn test_summary_totals() {
    let db = Database::open_in_memory().unwrap();
    let budget = BudgetLimits::load(&db);
    let spent = spending(&[(Category::Food, dec!(3500)), (Category::Transport, dec!(500))]);
    let summary = budget.summary(&spent);

    assert_eq!(summary.total_budget, dec!(7500));
    assert_eq!(summary.total_spent, dec!(4000));
    assert_eq!(summary.total_remaining, dec!(3500));
    assert_eq!(summary.within_budget, 3);
    assert_eq!(summary.category_count, 4);
    assert_eq!(summary.max_overspend, dec!(500));
}

#[test]
fn test_summary_remaining_can_go_negative() {
    let db = Database::open_in_memory().unwrap();
    let budget = BudgetLimits::load(&db);
    let spent = spending(&[
        (Category::Food, dec!(5000)),
        (Category::Entertainment, dec!(4000)),
    ]);
    let summary = budget.summary(&spent);
    assert_eq!(summary.total_remaining, dec!(-1500));
    assert_eq!(summary.total_percentage, dec!(100));
    assert_eq!(summary.max_overspend, dec!(2000));
    assert_eq!(summary.within_budget, 2);
}

#[test]
fn test_summary_nothing_spent() {
    let db = Database::open_in_memory().unwrap();
    let budget = BudgetLimits::load(&db);
    let summary = budget.summary(&BTreeMap::new());
    assert_eq!(summary.total_spent, Decimal::ZERO);
    assert_eq!(summary.total_percentage, Decimal::ZERO);
    assert_eq!(summary.max_overspend, Decimal::ZERO);
    assert_eq!(summary.within_budget, 4);
}

#[test]
fn test_statuses_cover_every_category() {
    let db = Database::open_in_memory().unwrap();
    let budget = BudgetLimits::load(&db);
    let statuses = budget.statuses(&spending(&[(Category::Food, dec!(10))]));
    assert_eq!(statuses.len(), 4);
    assert_eq!(statuses[0].0, Category::Food);
    assert_eq!(statuses[0].1.spent, dec!(10));
    assert_eq!(statuses[3].1.spent, Decimal::ZERO);
}

#[test]
fn test_summary_with_huge_spending_saturates() {
    let db = Database::open_in_memory().unwrap();
    let budget = BudgetLimits::load(&db);
    let spent = spending(&[
        (Category::Food, Decimal::MAX),
        (Category::Transport, Decimal::MAX),
    ]);

    let summary = budget.summary(&spent);
    assert_eq!(summary.total_spent, Decimal::MAX);
    assert_eq!(summary.total_percentage, dec!(100));
    assert_eq!(summary.within_budget, 2);
    assert!(summary.total_remaining < Decimal::ZERO);
    assert!(summary.max_overspend > Decimal::ZERO);
}
