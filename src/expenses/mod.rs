use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::models::{Category, Expense};
use crate::storage::{self, KeyValueStore, EXPENSES_KEY};

/// The expense log. Owns the in-memory records and writes them back to the
/// store after every successful mutation.
pub(crate) struct ExpenseLedger<'s> {
    store: &'s dyn KeyValueStore,
    expenses: Vec<Expense>,
}

impl<'s> ExpenseLedger<'s> {
    pub(crate) fn load(store: &'s dyn KeyValueStore) -> Self {
        let mut expenses: Vec<Expense> = storage::load_records(store, EXPENSES_KEY);
        let before = expenses.len();
        expenses.retain(|e| e.amount > Decimal::ZERO);
        if expenses.len() != before {
            tracing::warn!(
                dropped = before - expenses.len(),
                "dropped stored expenses with non-positive amounts"
            );
        }
        Self { store, expenses }
    }

    pub(crate) fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub(crate) fn len(&self) -> usize {
        self.expenses.len()
    }

    pub(crate) fn add(
        &mut self,
        date: NaiveDate,
        amount: Decimal,
        category: Category,
        description: Option<String>,
    ) -> Result<Expense, ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        let expense = Expense {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            amount,
            category,
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };
        self.expenses.push(expense.clone());
        self.persist();
        Ok(expense)
    }

    /// Returns false if no expense has this id.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        if self.expenses.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Format: "YYYY-MM"
    pub(crate) fn expenses_in_month(&self, year_month: &str) -> Vec<Expense> {
        self.expenses
            .iter()
            .filter(|e| e.in_month(year_month))
            .cloned()
            .collect()
    }

    fn persist(&self) {
        storage::save(self.store, EXPENSES_KEY, &self.expenses);
    }
}

/// Sum of amounts per category. Categories with nothing spent are absent.
pub(crate) fn totals_by_category(expenses: &[Expense]) -> BTreeMap<Category, Decimal> {
    let mut totals = BTreeMap::new();
    for e in expenses {
        let total = totals.entry(e.category).or_insert(Decimal::ZERO);
        *total = total.saturating_add(e.amount);
    }
    totals.retain(|_, total| !total.is_zero());
    totals
}

pub(crate) fn month_total(expenses: &[Expense]) -> Decimal {
    expenses
        .iter()
        .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.amount))
}

/// Each category's share of the total, as a whole percentage.
pub(crate) fn category_shares(expenses: &[Expense]) -> BTreeMap<Category, Decimal> {
    let total = month_total(expenses);
    totals_by_category(expenses)
        .into_iter()
        .map(|(category, amount)| {
            let share = if total.is_zero() {
                Decimal::ZERO
            } else {
                amount
                    .checked_div(total)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                    .unwrap_or(Decimal::ONE_HUNDRED)
                    .round()
            };
            (category, share)
        })
        .collect()
}

pub(crate) fn sorted_newest_first(expenses: &[Expense]) -> Vec<Expense> {
    let mut sorted = expenses.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

#[cfg(test)]
mod tests;
