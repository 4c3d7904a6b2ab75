mod expense;
mod goal;

pub(crate) use expense::{Category, Expense};
pub(crate) use goal::{GoalCurrency, GoalStatus, SavingsGoal};
