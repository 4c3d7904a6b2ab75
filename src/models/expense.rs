use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub(crate) enum Category {
    Food,
    Transport,
    Entertainment,
    Other,
}

impl Category {
    /// Storage key, also the form accepted on the command line.
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Other => "Other",
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Food => "💵 Food",
            Self::Transport => "🚗 Transport",
            Self::Entertainment => "🎮 Entertainment",
            Self::Other => "📌 Other",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" => Some(Self::Food),
            "transport" => Some(Self::Transport),
            "entertainment" => Some(Self::Entertainment),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub(crate) fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Entertainment,
            Self::Other,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Expense {
    pub(crate) id: String,
    pub(crate) date: NaiveDate,
    pub(crate) amount: Decimal,
    pub(crate) category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
}

impl Expense {
    /// Format: "YYYY-MM"
    pub(crate) fn year_month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    pub(crate) fn in_month(&self, year_month: &str) -> bool {
        self.year_month() == year_month
    }
}
