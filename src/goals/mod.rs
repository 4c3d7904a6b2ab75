use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{GoalCurrency, SavingsGoal};
use crate::storage::{self, KeyValueStore, GOALS_KEY};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GoalStats {
    /// Summed across goals regardless of currency.
    pub(crate) total_saved: Decimal,
    pub(crate) completed: usize,
    pub(crate) in_progress: usize,
}

pub(crate) struct SavingsGoals<'s> {
    store: &'s dyn KeyValueStore,
    goals: Vec<SavingsGoal>,
}

impl<'s> SavingsGoals<'s> {
    pub(crate) fn load(store: &'s dyn KeyValueStore) -> Self {
        let mut goals: Vec<SavingsGoal> = storage::load_records(store, GOALS_KEY);
        goals.retain(|g| {
            let keep = g.target > Decimal::ZERO;
            if !keep {
                tracing::warn!(id = %g.id, "dropping stored goal with non-positive target");
            }
            keep
        });
        for goal in &mut goals {
            goal.saved = goal.saved.clamp(Decimal::ZERO, goal.target);
        }
        Self { store, goals }
    }

    pub(crate) fn goals(&self) -> &[SavingsGoal] {
        &self.goals
    }

    pub(crate) fn get(&self, id: &str) -> Option<&SavingsGoal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub(crate) fn create(
        &mut self,
        name: &str,
        target: Decimal,
        currency: GoalCurrency,
        deadline: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<SavingsGoal, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if target <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveTarget(target));
        }
        let deadline = deadline.ok_or(ValidationError::MissingDeadline)?;

        let goal = SavingsGoal {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            target,
            saved: Decimal::ZERO,
            currency,
            deadline,
            created_at: today,
        };
        self.goals.push(goal.clone());
        self.persist();
        Ok(goal)
    }

    /// Add to a goal's savings. Anything past the target is dropped.
    pub(crate) fn deposit(
        &mut self,
        id: &str,
        amount: Decimal,
    ) -> Result<SavingsGoal, ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| ValidationError::NotFound(id.to_string()))?;
        goal.saved = goal
            .saved
            .checked_add(amount)
            .map_or(goal.target, |total| total.min(goal.target));
        let updated = goal.clone();
        self.persist();
        Ok(updated)
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        if self.goals.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Completed first, then urgent, active, and overdue last. Ties keep
    /// insertion order.
    pub(crate) fn sorted_for_display(&self, today: NaiveDate) -> Vec<&SavingsGoal> {
        let mut sorted: Vec<&SavingsGoal> = self.goals.iter().collect();
        sorted.sort_by_key(|g| std::cmp::Reverse(g.status(today).rank()));
        sorted
    }

    pub(crate) fn stats(&self) -> GoalStats {
        let completed = self.goals.iter().filter(|g| g.is_complete()).count();
        GoalStats {
            total_saved: self
                .goals
                .iter()
                .fold(Decimal::ZERO, |acc, g| acc.saturating_add(g.saved)),
            completed,
            in_progress: self.goals.len() - completed,
        }
    }

    fn persist(&self) {
        storage::save(self.store, GOALS_KEY, &self.goals);
    }
}
