//! Type-safe price representation using decimal arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., euros, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display (e.g., "€19.99", "¥1200").
    ///
    /// The amount is rounded to the currency's minor units.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.amount.round_dp_with_strategy(
            self.currency_code.minor_units(),
            RoundingStrategy::MidpointAwayFromZero,
        );
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let precision = self.currency_code.minor_units() as usize;
        format!(
            "{sign}{}{:.precision$}",
            self.currency_code.symbol(),
            rounded.abs()
        )
    }
}

/// ISO 4217 currency codes used across the supported locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EUR,
    SEK,
    GBP,
    SAR,
    CNY,
    JPY,
    USD,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::EUR => "€",
            Self::SEK => "kr ",
            Self::GBP => "£",
            Self::SAR => "﷼",
            Self::CNY | Self::JPY => "¥",
            Self::USD => "$",
        }
    }

    /// Number of decimal places in the currency's minor unit.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        let price = Price::new(Decimal::new(125, 1), CurrencyCode::EUR);
        assert_eq!(price.display(), "€12.50");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        let price = Price::new(Decimal::new(10_005, 3), CurrencyCode::GBP);
        assert_eq!(price.display(), "£10.01");
    }

    #[test]
    fn test_display_yen_has_no_minor_units() {
        let price = Price::new(Decimal::new(1_200_4, 1), CurrencyCode::JPY);
        assert_eq!(price.display(), "¥1200");
    }

    #[test]
    fn test_display_negative() {
        let price = Price::new(Decimal::new(-5, 0), CurrencyCode::USD);
        assert_eq!(price.display(), "-$5.00");
    }

    #[test]
    fn test_default_currency_is_euro() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::EUR);
    }
}
