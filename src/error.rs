use rust_decimal::Decimal;
use thiserror::Error;

/// Rejections raised by the domain aggregates. State is untouched whenever
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("amount must be greater than zero (got {0})")]
    NonPositiveAmount(Decimal),
    #[error("budget limit must be greater than zero (got {0})")]
    NonPositiveLimit(Decimal),
    #[error("goal target must be greater than zero (got {0})")]
    NonPositiveTarget(Decimal),
    #[error("goal name must not be empty")]
    EmptyName,
    #[error("a deadline is required")]
    MissingDeadline,
    #[error("no record with id {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ConversionError {
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("rate for {0} is not positive")]
    InvalidRate(String),
    #[error("converted amount is out of range")]
    Overflow,
}

/// Why a rate fetch did not produce a usable table.
#[derive(Debug, Error)]
pub(crate) enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed rate table: {0}")]
    Malformed(String),
}
