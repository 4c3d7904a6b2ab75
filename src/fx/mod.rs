mod source;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConversionError;

pub(crate) use source::{HttpRateProvider, Provenance, RateProvider, RateSource};

/// Every factor in a rate table is expressed against this currency.
pub(crate) const BASE_CURRENCY: &str = "UAH";

/// Currency code → units of that currency per one unit of [`BASE_CURRENCY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct RateTable(BTreeMap<String, Decimal>);

impl RateTable {
    #[cfg(test)]
    pub(crate) fn new(rates: BTreeMap<String, Decimal>) -> Self {
        Self(rates)
    }

    /// Compiled-in table used when neither the network nor the cache has rates.
    pub(crate) fn fallback() -> Self {
        let rates = [
            (BASE_CURRENCY, Decimal::ONE),
            ("USD", dec!(0.025)),
            ("EUR", dec!(0.023)),
            ("PLN", dec!(0.1)),
            ("GBP", dec!(0.02)),
        ];
        Self(
            rates
                .into_iter()
                .map(|(code, rate)| (code.to_string(), rate))
                .collect(),
        )
    }

    pub(crate) fn get(&self, code: &str) -> Option<Decimal> {
        self.0.get(code).copied()
    }

    pub(crate) fn currencies(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// The base currency must be present at exactly 1 and every other
    /// factor must be positive.
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self.get(BASE_CURRENCY) {
            Some(rate) if rate == Decimal::ONE => {}
            Some(rate) => {
                return Err(format!(
                    "base currency {BASE_CURRENCY} has rate {rate}, expected 1"
                ))
            }
            None => return Err(format!("base currency {BASE_CURRENCY} is missing")),
        }
        if let Some((code, rate)) = self.0.iter().find(|(_, rate)| **rate <= Decimal::ZERO) {
            return Err(format!("rate for {code} is not positive ({rate})"));
        }
        Ok(())
    }
}

fn positive_rate(table: &RateTable, code: &str) -> Result<Decimal, ConversionError> {
    let rate = table
        .get(code)
        .ok_or_else(|| ConversionError::UnknownCurrency(code.to_string()))?;
    if rate <= Decimal::ZERO {
        return Err(ConversionError::InvalidRate(code.to_string()));
    }
    Ok(rate)
}

/// Convert `amount` from one currency to another through the base currency.
/// The result keeps full precision; round only for display.
pub(crate) fn convert(
    amount: Decimal,
    from: &str,
    to: &str,
    table: &RateTable,
) -> Result<Decimal, ConversionError> {
    let from_rate = positive_rate(table, from)?;
    let to_rate = positive_rate(table, to)?;
    amount
        .checked_div(from_rate)
        .and_then(|in_base| in_base.checked_mul(to_rate))
        .ok_or(ConversionError::Overflow)
}

/// Units of the base currency bought by one unit of `code`.
pub(crate) fn inverse_rate(code: &str, table: &RateTable) -> Result<Decimal, ConversionError> {
    Decimal::ONE
        .checked_div(positive_rate(table, code)?)
        .ok_or(ConversionError::Overflow)
}
