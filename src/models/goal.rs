use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Average month length used to turn days into months.
const AVG_DAYS_PER_MONTH: Decimal = dec!(30.44);

/// Goals closer than this many days to their deadline are urgent.
const URGENT_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum GoalCurrency {
    #[serde(rename = "UAH")]
    Uah,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
}

impl GoalCurrency {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Uah => "UAH",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "UAH" => Some(Self::Uah),
            "USD" => Some(Self::Usd),
            "EUR" => Some(Self::Eur),
            _ => None,
        }
    }
}

impl std::fmt::Display for GoalCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GoalStatus {
    Completed,
    Overdue,
    Urgent,
    Active,
}

impl GoalStatus {
    /// Display priority, highest first. Overdue goals sink to the bottom.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Self::Completed => 3,
            Self::Urgent => 2,
            Self::Active => 1,
            Self::Overdue => 0,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Completed => "✓ Reached",
            Self::Overdue => "⚠ Overdue",
            Self::Urgent => "🔥 Urgent",
            Self::Active => "⏳ Active",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SavingsGoal {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) target: Decimal,
    pub(crate) saved: Decimal,
    pub(crate) currency: GoalCurrency,
    pub(crate) deadline: NaiveDate,
    pub(crate) created_at: NaiveDate,
}

impl SavingsGoal {
    pub(crate) fn is_complete(&self) -> bool {
        self.saved >= self.target
    }

    pub(crate) fn remaining(&self) -> Decimal {
        self.target.saturating_sub(self.saved).max(Decimal::ZERO)
    }

    pub(crate) fn progress_percent(&self) -> Decimal {
        if self.target.is_zero() {
            return Decimal::ZERO;
        }
        self.saved
            .checked_div(self.target)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Decimal::ONE_HUNDRED, |pct| pct.min(Decimal::ONE_HUNDRED))
    }

    /// Whole days from `today` until the deadline. Negative once overdue.
    pub(crate) fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    /// How much has to be put aside per month to hit the target on time.
    /// An expired deadline counts as one day left. Saturates at
    /// `Decimal::MAX` when the figure is too large to represent.
    pub(crate) fn monthly_needed(&self, today: NaiveDate) -> Decimal {
        let days_left = Decimal::from(self.days_remaining(today).max(1));
        let months_left = days_left / AVG_DAYS_PER_MONTH;
        self.remaining()
            .checked_div(months_left)
            .unwrap_or(Decimal::MAX)
            .max(Decimal::ZERO)
    }

    pub(crate) fn status(&self, today: NaiveDate) -> GoalStatus {
        if self.is_complete() {
            return GoalStatus::Completed;
        }
        let days_left = self.days_remaining(today);
        if days_left < 0 {
            GoalStatus::Overdue
        } else if days_left < URGENT_DAYS {
            GoalStatus::Urgent
        } else {
            GoalStatus::Active
        }
    }
}
