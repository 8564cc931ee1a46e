//! Shipping rate lookup.

use std::io::Write;

use maxfood_core::pricing::shipping_cost_for;
use maxfood_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

use crate::error::CliError;

/// Print the shipping cost for `method` and an optional weight in kilograms.
///
/// # Errors
///
/// Returns an error for an unknown method or a negative weight.
pub fn quote(
    method: &str,
    weight: Option<Decimal>,
    currency: CurrencyCode,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let cost = shipping_cost_for(method, weight)?;
    writeln!(out, "{}", Price::new(cost, currency).display())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_prints_cost() {
        let mut out = Vec::new();
        quote("overnight", Some("21".parse().unwrap()), CurrencyCode::EUR, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "€36.00\n");
    }

    #[test]
    fn test_unknown_method() {
        let result = quote("pigeon", None, CurrencyCode::EUR, &mut Vec::new());
        assert!(matches!(result, Err(CliError::Pricing(_))));
    }
}
