use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Write;
use std::path::Path;

use super::args::{BudgetCommand, Command, ExpenseCommand, GoalCommand, StorageCommand};
use crate::budget::BudgetLimits;
use crate::config::AppConfig;
use crate::db::Database;
use crate::expenses::{self, ExpenseLedger};
use crate::fx::{self, HttpRateProvider, Provenance, RateSource, BASE_CURRENCY};
use crate::goals::SavingsGoals;
use crate::models::{Expense, GoalStatus};
use crate::storage;
use crate::ui::util::{format_amount, format_currency, format_percent, progress_bar, truncate};

/// Everything a command needs besides its own arguments.
pub(crate) struct Session<'a> {
    pub(crate) db: &'a Database,
    pub(crate) config: &'a AppConfig,
    pub(crate) today: NaiveDate,
}

impl Session<'_> {
    fn current_month(&self) -> String {
        self.today.format("%Y-%m").to_string()
    }
}

pub(crate) async fn as_cli(command: Command, session: &Session<'_>, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Rates { offline } => cli_rates(offline, session, out).await,
        Command::Convert {
            amount,
            from,
            to,
            offline,
        } => cli_convert(amount, &from, &to, offline, session, out).await,
        Command::Expense(cmd) => cli_expense(cmd, session, out),
        Command::Budget(cmd) => cli_budget(cmd, session, out),
        Command::Goal(cmd) => cli_goal(cmd, session, out),
        Command::Storage(cmd) => cli_storage(cmd, session, out),
    }
}

// ── Rates ─────────────────────────────────────────────────────

async fn resolve_rates<'a>(session: &Session<'a>, offline: bool) -> Result<RateSource<'a>> {
    let mut source = RateSource::new(session.db);
    if offline {
        source.load_offline();
    } else {
        let provider =
            HttpRateProvider::new(&session.config.rates_url, session.config.fetch_timeout())
                .context("Failed to build HTTP client")?;
        source.refresh(&provider).await;
    }
    Ok(source)
}

fn offline_notice(source: &RateSource<'_>) -> Option<&'static str> {
    if !source.is_offline() {
        return None;
    }
    match source.provenance() {
        Provenance::Cached => Some("⚠ Offline: using cached rates"),
        _ => Some("⚠ Offline: using built-in fallback rates"),
    }
}

async fn cli_rates(offline: bool, session: &Session<'_>, out: &mut dyn Write) -> Result<()> {
    let source = resolve_rates(session, offline).await?;
    writeln!(
        out,
        "Rates ({}), {}",
        source.provenance(),
        session.today.format("%-d %B %Y")
    )?;
    writeln!(out, "{}", "─".repeat(40))?;
    for code in source.table().currencies().filter(|c| *c != BASE_CURRENCY) {
        let per_unit = fx::inverse_rate(code, source.table())?;
        writeln!(out, "  1 {code:<4} = {}", format_currency(per_unit, BASE_CURRENCY))?;
    }
    if let Some(notice) = offline_notice(&source) {
        writeln!(out)?;
        writeln!(out, "{notice}")?;
    }
    Ok(())
}

async fn cli_convert(
    amount: Decimal,
    from: &str,
    to: &str,
    offline: bool,
    session: &Session<'_>,
    out: &mut dyn Write,
) -> Result<()> {
    if amount <= Decimal::ZERO {
        anyhow::bail!("Amount must be greater than zero");
    }
    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();
    let source = resolve_rates(session, offline).await?;
    let converted = fx::convert(amount, &from, &to, source.table())?;
    writeln!(
        out,
        "{} = {}",
        format_currency(amount, &from),
        format_currency(converted, &to)
    )?;
    if let Some(notice) = offline_notice(&source) {
        writeln!(out, "{notice}")?;
    }
    Ok(())
}

// ── Expenses ──────────────────────────────────────────────────

fn cli_expense(cmd: ExpenseCommand, session: &Session<'_>, out: &mut dyn Write) -> Result<()> {
    let mut ledger = ExpenseLedger::load(session.db);
    match cmd {
        ExpenseCommand::Add {
            amount,
            category,
            date,
            description,
        } => {
            let date = date.unwrap_or(session.today);
            let expense = ledger.add(date, amount, category, description)?;
            writeln!(
                out,
                "Added {} {} on {} ({})",
                category,
                format_currency(expense.amount, BASE_CURRENCY),
                expense.date,
                expense.id
            )?;
        }
        ExpenseCommand::List { month } => {
            let month = month.unwrap_or_else(|| session.current_month());
            let listed = expenses::sorted_newest_first(&ledger.expenses_in_month(&month));
            if listed.is_empty() {
                writeln!(out, "No expenses for {month}")?;
                return Ok(());
            }
            print_expense_table(&listed, out)?;
            writeln!(out)?;
            writeln!(out, "{} of {} expenses", listed.len(), ledger.len())?;
        }
        ExpenseCommand::Summary { month } => {
            let month = month.unwrap_or_else(|| session.current_month());
            let in_month = ledger.expenses_in_month(&month);
            writeln!(out, "Expenses: {}", month_label(&month))?;
            writeln!(out, "{}", "─".repeat(40))?;
            if in_month.is_empty() {
                writeln!(out, "  No expenses recorded")?;
                return Ok(());
            }
            let totals = expenses::totals_by_category(&in_month);
            let shares = expenses::category_shares(&in_month);
            for (category, total) in &totals {
                let share = shares.get(category).copied().unwrap_or(Decimal::ZERO);
                writeln!(
                    out,
                    "  {:<18} {:>16} {:>5}",
                    category.label(),
                    format_currency(*total, BASE_CURRENCY),
                    format_percent(share)
                )?;
            }
            writeln!(out)?;
            writeln!(
                out,
                "  {:<18} {:>16}",
                "Total",
                format_currency(expenses::month_total(&in_month), BASE_CURRENCY)
            )?;
            writeln!(out, "  Records: {}", in_month.len())?;
        }
        ExpenseCommand::Remove { id } => {
            if !ledger.remove(&id) {
                anyhow::bail!("Expense not found: {id}");
            }
            writeln!(out, "Removed expense {id}")?;
        }
        ExpenseCommand::Export { path, month } => {
            let selected = match &month {
                Some(m) => ledger.expenses_in_month(m),
                None => ledger.expenses().to_vec(),
            };
            let path = path.map(|p| shellexpand(&p)).unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
                let suffix = month.as_deref().unwrap_or("all");
                format!("{home}/pocketfin-expenses-{suffix}.csv")
            });
            let count = crate::export::export_expenses_csv(Path::new(&path), &selected)?;
            if count == 0 {
                writeln!(out, "No expenses to export; wrote header only to {path}")?;
            } else {
                writeln!(out, "Exported {count} expenses to {path}")?;
            }
        }
    }
    Ok(())
}

fn print_expense_table(listed: &[Expense], out: &mut dyn Write) -> Result<()> {
    writeln!(
        out,
        "{:<36} {:<10} {:<18} {:>16} Description",
        "ID", "Date", "Category", "Amount"
    )?;
    writeln!(out, "{}", "─".repeat(100))?;
    for e in listed {
        writeln!(
            out,
            "{:<36} {:<10} {:<18} {:>16} {}",
            e.id,
            e.date,
            e.category.label(),
            format_currency(e.amount, BASE_CURRENCY),
            truncate(e.description.as_deref().unwrap_or(""), 30)
        )?;
    }
    Ok(())
}

// ── Budget ────────────────────────────────────────────────────

fn cli_budget(cmd: BudgetCommand, session: &Session<'_>, out: &mut dyn Write) -> Result<()> {
    let mut budget = BudgetLimits::load(session.db);
    match cmd {
        BudgetCommand::Show { month } => {
            let month = month.unwrap_or_else(|| session.current_month());
            let ledger = ExpenseLedger::load(session.db);
            let spending = expenses::totals_by_category(&ledger.expenses_in_month(&month));

            writeln!(out, "Budget: {}", month_label(&month))?;
            writeln!(out, "{}", "─".repeat(72))?;
            for (category, status) in budget.statuses(&spending) {
                let flag = if status.is_exceeded { "  EXCEEDED" } else { "" };
                writeln!(
                    out,
                    "  {:<18} {} {:>5}  {} / {}  left {}{flag}",
                    category.label(),
                    progress_bar(status.percentage, 20),
                    format_percent(status.percentage),
                    format_currency(status.spent, BASE_CURRENCY),
                    format_currency(status.limit, BASE_CURRENCY),
                    format_currency(status.remaining, BASE_CURRENCY),
                )?;
            }

            let summary = budget.summary(&spending);
            writeln!(out)?;
            writeln!(out, "  Total budget:     {}", format_currency(summary.total_budget, BASE_CURRENCY))?;
            writeln!(out, "  Total spent:      {}", format_currency(summary.total_spent, BASE_CURRENCY))?;
            writeln!(
                out,
                "  Total remaining:  {}",
                format_currency(summary.total_remaining, BASE_CURRENCY)
            )?;
            writeln!(
                out,
                "  Overall:          {} {}",
                progress_bar(summary.total_percentage, 20),
                format_percent(summary.total_percentage)
            )?;
            writeln!(
                out,
                "  Within budget:    {} / {}",
                summary.within_budget, summary.category_count
            )?;
            writeln!(
                out,
                "  Largest overrun:  {}",
                format_currency(summary.max_overspend, BASE_CURRENCY)
            )?;
        }
        BudgetCommand::Set { category, limit } => {
            budget.set_limit(category, limit)?;
            writeln!(
                out,
                "Limit for {category} set to {}",
                format_currency(limit, BASE_CURRENCY)
            )?;
        }
        BudgetCommand::Reset => {
            budget.reset_to_defaults();
            writeln!(out, "All limits restored to defaults")?;
            for (category, limit) in budget.limits() {
                writeln!(out, "  {:<18} {}", category.label(), format_currency(*limit, BASE_CURRENCY))?;
            }
        }
    }
    Ok(())
}

// ── Goals ─────────────────────────────────────────────────────

fn cli_goal(cmd: GoalCommand, session: &Session<'_>, out: &mut dyn Write) -> Result<()> {
    let mut goals = SavingsGoals::load(session.db);
    match cmd {
        GoalCommand::Add {
            name,
            target,
            currency,
            deadline,
        } => {
            let goal = goals.create(&name, target, currency, deadline, session.today)?;
            writeln!(
                out,
                "Created goal '{}' for {} by {} ({})",
                goal.name,
                format_currency(goal.target, goal.currency.as_str()),
                goal.deadline,
                goal.id
            )?;
        }
        GoalCommand::List => {
            if goals.goals().is_empty() {
                writeln!(out, "No savings goals")?;
                return Ok(());
            }
            for goal in goals.sorted_for_display(session.today) {
                let code = goal.currency.as_str();
                let status = goal.status(session.today);
                writeln!(out, "{}  [{}]  {}", goal.name, status, goal.id)?;
                writeln!(
                    out,
                    "  {} {:>5}  {} / {}",
                    progress_bar(goal.progress_percent(), 20),
                    format_percent(goal.progress_percent()),
                    format_currency(goal.saved, code),
                    format_currency(goal.target, code)
                )?;
                if !goal.is_complete() {
                    let days = goal.days_remaining(session.today);
                    let when = match status {
                        GoalStatus::Overdue => format!("{} days overdue", -days),
                        _ => format!("{days} days left"),
                    };
                    writeln!(
                        out,
                        "  Deadline {} ({when}), remaining {}, needs {} / month",
                        goal.deadline,
                        format_currency(goal.remaining(), code),
                        format_currency(goal.monthly_needed(session.today), code)
                    )?;
                }
            }
            let stats = goals.stats();
            writeln!(out)?;
            writeln!(
                out,
                "Goals: {} reached, {} in progress, {} saved in total",
                stats.completed,
                stats.in_progress,
                format_amount(stats.total_saved)
            )?;
        }
        GoalCommand::Deposit { id, amount } => {
            let goal = goals.deposit(&id, amount)?;
            let code = goal.currency.as_str();
            writeln!(
                out,
                "'{}': {} / {}",
                goal.name,
                format_currency(goal.saved, code),
                format_currency(goal.target, code)
            )?;
            if goal.is_complete() {
                writeln!(out, "🎉 Goal reached!")?;
            }
        }
        GoalCommand::Remove { id } => {
            let name = goals
                .get(&id)
                .map(|g| g.name.clone())
                .ok_or_else(|| anyhow::anyhow!("Goal not found: {id}"))?;
            goals.remove(&id);
            writeln!(out, "Removed goal '{name}'")?;
        }
    }
    Ok(())
}

// ── Storage ───────────────────────────────────────────────────

fn cli_storage(cmd: StorageCommand, session: &Session<'_>, out: &mut dyn Write) -> Result<()> {
    match cmd {
        StorageCommand::Dump => {
            let all = storage::dump(session.db);
            writeln!(out, "{}", serde_json::to_string_pretty(&all)?)?;
        }
        StorageCommand::Clear { key } => {
            if storage::clear(session.db, &key) {
                writeln!(out, "Cleared {key}")?;
            } else {
                writeln!(out, "Nothing stored under {key}")?;
            }
        }
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────

/// "2024-03" → "March 2024"
fn month_label(month: &str) -> String {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| month.to_string())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
