use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::{Category, GoalCurrency};

#[derive(Parser, Debug)]
#[command(name = "pocketfin", version)]
#[command(about = "PocketFin - local-only currency converter, expense log, budgets and savings goals")]
pub(crate) struct Cli {
    /// Config file (TOML). Defaults to pocketfin.toml in the data directory.
    #[arg(long, global = true, env = "POCKETFIN_CONFIG")]
    pub(crate) config: Option<PathBuf>,
    /// Database file; overrides the configured path.
    #[arg(long, global = true)]
    pub(crate) db: Option<PathBuf>,
    /// Rate table URL; overrides the configured one.
    #[arg(long, global = true)]
    pub(crate) rates_url: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Show the current exchange rates against UAH
    Rates {
        /// Skip the network and use cached or built-in rates
        #[arg(long)]
        offline: bool,
    },
    /// Convert an amount between two currencies
    Convert {
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        amount: Decimal,
        from: String,
        to: String,
        /// Skip the network and use cached or built-in rates
        #[arg(long)]
        offline: bool,
    },
    /// Log and review expenses
    #[command(subcommand)]
    Expense(ExpenseCommand),
    /// Monthly category budgets
    #[command(subcommand)]
    Budget(BudgetCommand),
    /// Savings goals
    #[command(subcommand)]
    Goal(GoalCommand),
    /// Inspect or clear stored data
    #[command(subcommand)]
    Storage(StorageCommand),
}

#[derive(Subcommand, Debug)]
pub(crate) enum ExpenseCommand {
    Add {
        #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
        amount: Decimal,
        /// food, transport, entertainment or other
        #[arg(long, value_parser = parse_category)]
        category: Category,
        /// YYYY-MM-DD, defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List a month's expenses, newest first
    List {
        /// YYYY-MM, defaults to the current month
        #[arg(long, value_parser = parse_month)]
        month: Option<String>,
    },
    /// Totals by category for a month
    Summary {
        #[arg(long, value_parser = parse_month)]
        month: Option<String>,
    },
    Remove {
        id: String,
    },
    /// Write expenses to a CSV file
    Export {
        path: Option<String>,
        /// Only this month (YYYY-MM); everything when omitted
        #[arg(long, value_parser = parse_month)]
        month: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum BudgetCommand {
    /// Spending against each limit for a month
    Show {
        #[arg(long, value_parser = parse_month)]
        month: Option<String>,
    },
    Set {
        #[arg(value_parser = parse_category)]
        category: Category,
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        limit: Decimal,
    },
    /// Restore the default limit for every category
    Reset,
}

#[derive(Subcommand, Debug)]
pub(crate) enum GoalCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
        target: Decimal,
        /// UAH, USD or EUR
        #[arg(long, value_parser = parse_goal_currency, default_value = "UAH")]
        currency: GoalCurrency,
        /// YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        deadline: Option<NaiveDate>,
    },
    List,
    Deposit {
        id: String,
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        amount: Decimal,
    },
    Remove {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum StorageCommand {
    /// Print every stored key as JSON
    Dump,
    Clear {
        key: String,
    },
}

/// Accepts `1,234.50`, `1 234.50` and `1_234.50`.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal, String> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.is_empty() {
        return Err("amount is empty".into());
    }
    Decimal::from_str(&cleaned).map_err(|_| format!("'{s}' is not a valid amount"))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{s}' is not a date (expected YYYY-MM-DD)"))
}

pub(crate) fn parse_month(s: &str) -> Result<String, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m").to_string())
        .map_err(|_| format!("'{s}' is not a month (expected YYYY-MM)"))
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse(s).ok_or_else(|| {
        let known: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        format!("unknown category '{s}' (expected one of: {})", known.join(", "))
    })
}

fn parse_goal_currency(s: &str) -> Result<GoalCurrency, String> {
    GoalCurrency::parse(s).ok_or_else(|| format!("unsupported goal currency '{s}' (UAH, USD or EUR)"))
}
