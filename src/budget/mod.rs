use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::models::Category;
use crate::storage::{self, KeyValueStore, BUDGET_KEY};

pub(crate) fn default_limit(category: Category) -> Decimal {
    match category {
        Category::Food => dec!(3000),
        Category::Transport => dec!(1500),
        Category::Entertainment => dec!(2000),
        Category::Other => dec!(1000),
    }
}

/// Spending against one category's limit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetStatus {
    pub(crate) spent: Decimal,
    pub(crate) limit: Decimal,
    pub(crate) remaining: Decimal,
    /// Capped at 100 for display; see `is_exceeded` for the real verdict.
    pub(crate) percentage: Decimal,
    pub(crate) is_exceeded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetSummary {
    pub(crate) total_budget: Decimal,
    pub(crate) total_spent: Decimal,
    /// Negative when the month as a whole is over budget.
    pub(crate) total_remaining: Decimal,
    pub(crate) total_percentage: Decimal,
    pub(crate) within_budget: usize,
    pub(crate) category_count: usize,
    pub(crate) max_overspend: Decimal,
}

/// Per-category spending limits. Always holds a positive limit for every
/// category.
pub(crate) struct BudgetLimits<'s> {
    store: &'s dyn KeyValueStore,
    limits: BTreeMap<Category, Decimal>,
}

impl<'s> BudgetLimits<'s> {
    pub(crate) fn load(store: &'s dyn KeyValueStore) -> Self {
        let stored: BTreeMap<String, serde_json::Value> =
            storage::load(store, BUDGET_KEY, BTreeMap::new());
        let limits = Category::all()
            .iter()
            .map(|&category| {
                let parsed = stored
                    .get(category.as_str())
                    .map(|raw| serde_json::from_value::<Decimal>(raw.clone()));
                let limit = match parsed {
                    Some(Ok(value)) if value > Decimal::ZERO => value,
                    Some(Ok(value)) => {
                        tracing::warn!(%category, %value, "ignoring non-positive stored limit");
                        default_limit(category)
                    }
                    Some(Err(e)) => {
                        tracing::warn!(%category, error = %e, "ignoring unreadable stored limit");
                        default_limit(category)
                    }
                    None => default_limit(category),
                };
                (category, limit)
            })
            .collect();
        Self { store, limits }
    }

    pub(crate) fn limits(&self) -> &BTreeMap<Category, Decimal> {
        &self.limits
    }

    pub(crate) fn limit(&self, category: Category) -> Decimal {
        self.limits
            .get(&category)
            .copied()
            .unwrap_or_else(|| default_limit(category))
    }

    pub(crate) fn set_limit(
        &mut self,
        category: Category,
        value: Decimal,
    ) -> Result<(), ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveLimit(value));
        }
        self.limits.insert(category, value);
        self.persist();
        Ok(())
    }

    pub(crate) fn reset_to_defaults(&mut self) {
        for &category in Category::all() {
            self.limits.insert(category, default_limit(category));
        }
        self.persist();
    }

    pub(crate) fn status(&self, category: Category, spent: Decimal) -> BudgetStatus {
        let limit = self.limit(category);
        BudgetStatus {
            spent,
            limit,
            remaining: limit.saturating_sub(spent).max(Decimal::ZERO),
            percentage: capped_percentage(spent, limit),
            is_exceeded: spent > limit,
        }
    }

    /// Status of every category given this month's spending. Categories
    /// missing from `spending` count as zero.
    pub(crate) fn statuses(
        &self,
        spending: &BTreeMap<Category, Decimal>,
    ) -> Vec<(Category, BudgetStatus)> {
        Category::all()
            .iter()
            .map(|&category| {
                let spent = spending.get(&category).copied().unwrap_or(Decimal::ZERO);
                (category, self.status(category, spent))
            })
            .collect()
    }

    pub(crate) fn summary(&self, spending: &BTreeMap<Category, Decimal>) -> BudgetSummary {
        let total_budget = saturating_sum(self.limits.values().copied());
        let total_spent = saturating_sum(spending.values().copied());
        let total_percentage = capped_percentage(total_spent, total_budget);

        let statuses = self.statuses(spending);
        let within_budget = statuses.iter().filter(|(_, s)| !s.is_exceeded).count();
        let max_overspend = statuses
            .iter()
            .filter(|(_, s)| s.is_exceeded)
            .map(|(_, s)| s.spent.saturating_sub(s.limit))
            .max()
            .unwrap_or(Decimal::ZERO);

        BudgetSummary {
            total_budget,
            total_spent,
            total_remaining: total_budget.saturating_sub(total_spent),
            total_percentage,
            within_budget,
            category_count: statuses.len(),
            max_overspend,
        }
    }

    fn persist(&self) {
        let by_key: BTreeMap<&str, Decimal> = self
            .limits
            .iter()
            .map(|(category, limit)| (category.as_str(), *limit))
            .collect();
        storage::save(self.store, BUDGET_KEY, &by_key);
    }
}

/// `part / whole` as a percentage capped at 100. Zero when `whole` is zero;
/// a quotient too large to represent is past the cap anyway.
fn capped_percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ONE_HUNDRED, |pct| pct.min(Decimal::ONE_HUNDRED))
}

fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
mod tests;
