#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::db::Database;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn seed(ledger: &mut ExpenseLedger) {
    ledger.add(date("2024-03-05"), dec!(150.00), Category::Food, None).unwrap();
    ledger.add(date("2024-03-10"), dec!(40.50), Category::Transport, Some("bus pass".into())).unwrap();
    ledger.add(date("2024-03-21"), dec!(60.00), Category::Food, None).unwrap();
    ledger.add(date("2024-04-02"), dec!(300.00), Category::Entertainment, None).unwrap();
}

// ── add ───────────────────────────────────────────────────────

#[test]
fn test_add_single_expense_scenario() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    ledger.add(date("2024-03-05"), dec!(150.00), Category::Food, None).unwrap();

    let march = ledger.expenses_in_month("2024-03");
    assert_eq!(march.len(), 1);
    assert_eq!(month_total(&march), dec!(150.00));

    let totals = totals_by_category(&march);
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[&Category::Food], dec!(150.00));
}

#[test]
fn test_add_rejects_non_positive_amount() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    seed(&mut ledger);
    let before = ledger.len();

    for bad in [Decimal::ZERO, dec!(-0.01), dec!(-150)] {
        let err = ledger.add(date("2024-03-05"), bad, Category::Other, None).unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveAmount(bad));
    }
    assert_eq!(ledger.len(), before);
    assert_eq!(ExpenseLedger::load(&db).len(), before);
}

#[test]
fn test_add_generates_unique_ids() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    seed(&mut ledger);
    let mut ids: Vec<&str> = ledger.expenses().iter().map(|e| e.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_add_normalizes_blank_description() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    let e = ledger
        .add(date("2024-03-05"), dec!(1), Category::Other, Some("   ".into()))
        .unwrap();
    assert!(e.description.is_none());
    let e = ledger
        .add(date("2024-03-05"), dec!(1), Category::Other, Some(" taxi ".into()))
        .unwrap();
    assert_eq!(e.description.as_deref(), Some("taxi"));
}

#[test]
fn test_add_writes_through() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    seed(&mut ledger);

    let reloaded = ExpenseLedger::load(&db);
    assert_eq!(reloaded.expenses(), ledger.expenses());
}

// ── remove ────────────────────────────────────────────────────

#[test]
fn test_remove() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    seed(&mut ledger);
    let id = ledger.expenses()[0].id.clone();

    assert!(ledger.remove(&id));
    assert_eq!(ledger.len(), 3);
    assert!(!ledger.remove(&id));
    assert!(!ledger.remove("no-such-id"));
    assert_eq!(ExpenseLedger::load(&db).len(), 3);
}

// ── queries ───────────────────────────────────────────────────

#[test]
fn test_expenses_in_month() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    seed(&mut ledger);
    assert_eq!(ledger.expenses_in_month("2024-03").len(), 3);
    assert_eq!(ledger.expenses_in_month("2024-04").len(), 1);
    assert!(ledger.expenses_in_month("2024-05").is_empty());
}

#[test]
fn test_totals_by_category_omits_empty() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    seed(&mut ledger);
    let march = ledger.expenses_in_month("2024-03");
    let totals = totals_by_category(&march);
    assert_eq!(totals[&Category::Food], dec!(210.00));
    assert_eq!(totals[&Category::Transport], dec!(40.50));
    assert!(!totals.contains_key(&Category::Entertainment));
    assert!(!totals.contains_key(&Category::Other));
    assert_eq!(month_total(&march), dec!(250.50));
}

#[test]
fn test_month_total_empty() {
    assert_eq!(month_total(&[]), Decimal::ZERO);
    assert!(totals_by_category(&[]).is_empty());
}

#[test]
fn test_category_shares() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    ledger.add(date("2024-03-01"), dec!(200), Category::Food, None).unwrap();
    ledger.add(date("2024-03-02"), dec!(100), Category::Transport, None).unwrap();
    let shares = category_shares(ledger.expenses());
    assert_eq!(shares[&Category::Food], dec!(67));
    assert_eq!(shares[&Category::Transport], dec!(33));
}

#[test]
fn test_sorted_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    seed(&mut ledger);
    let sorted = sorted_newest_first(ledger.expenses());
    let dates: Vec<String> = sorted.iter().map(|e| e.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-04-02", "2024-03-21", "2024-03-10", "2024-03-05"]);
}

// ── loading ───────────────────────────────────────────────────

#[test]
fn test_load_corrupt_log_is_empty() {
    let db = Database::open_in_memory().unwrap();
    db.put_value(EXPENSES_KEY, "[{\"id\": 3").unwrap();
    assert_eq!(ExpenseLedger::load(&db).len(), 0);
}

#[test]
fn test_load_drops_non_positive_records() {
    let db = Database::open_in_memory().unwrap();
    db.put_value(
        EXPENSES_KEY,
        r#"[{"id":"a","date":"2024-03-01","amount":"10","category":"Food"},
            {"id":"b","date":"2024-03-01","amount":"-5","category":"Food"}]"#,
    )
    .unwrap();
    let ledger = ExpenseLedger::load(&db);
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.expenses()[0].id, "a");
}

#[test]
fn test_load_keeps_readable_records_next_to_unreadable_one() {
    let db = Database::open_in_memory().unwrap();
    db.put_value(
        EXPENSES_KEY,
        r#"[{"id":"a","date":"2024-03-01","amount":"10","category":"Food"},
            {"id":"b","date":"2024-03-01","amount":"20","category":"Groceries"}]"#,
    )
    .unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.expenses()[0].id, "a");

    ledger.add(date("2024-03-02"), dec!(5), Category::Other, None).unwrap();
    let reloaded = ExpenseLedger::load(&db);
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.expenses().iter().any(|e| e.id == "a"));
}

// ── large amounts ─────────────────────────────────────────────

#[test]
fn test_totals_saturate_instead_of_overflowing() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = ExpenseLedger::load(&db);
    ledger.add(date("2024-03-01"), Decimal::MAX, Category::Food, None).unwrap();
    ledger.add(date("2024-03-02"), Decimal::MAX, Category::Food, None).unwrap();
    ledger.add(date("2024-03-03"), dec!(1), Category::Other, None).unwrap();

    let march = ledger.expenses_in_month("2024-03");
    assert_eq!(month_total(&march), Decimal::MAX);
    assert_eq!(totals_by_category(&march)[&Category::Food], Decimal::MAX);
    let shares = category_shares(&march);
    assert_eq!(shares[&Category::Food], dec!(100));
    assert_eq!(shares[&Category::Other], Decimal::ZERO);
}
