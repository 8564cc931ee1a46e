//! Shipping rates, tax, coupons and order totals.
//!
//! Everything here is a pure function of its inputs. The failure modes are
//! input validation (an unrecognized shipping method or a negative weight)
//! and an order total too large to represent.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Flat tax rate applied to the cart subtotal (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Weight bracket size for the shipping surcharge, in kilograms.
const SURCHARGE_STEP_KG: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Surcharge added per started weight bracket.
const SURCHARGE_PER_STEP: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Pricing input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// The shipping method is not one of standard/express/overnight.
    #[error("unknown shipping method: {0}")]
    UnknownShippingMethod(String),

    /// Parcel weight must not be negative.
    #[error("weight must not be negative (got {0})")]
    InvalidWeight(Decimal),

    /// The order total does not fit in a decimal amount.
    #[error("order total would exceed the maximum amount")]
    AmountOverflow,
}

/// Delivery speed tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Standard,
    Express,
    Overnight,
}

impl ShippingMethod {
    /// Fixed base rate for the tier, before any weight surcharge.
    #[must_use]
    pub const fn base_rate(self) -> Decimal {
        match self {
            Self::Standard => Decimal::from_parts(5, 0, 0, false, 0),
            Self::Express => Decimal::from_parts(15, 0, 0, false, 0),
            Self::Overnight => Decimal::from_parts(30, 0, 0, false, 0),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Overnight => "overnight",
        }
    }
}

impl std::fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShippingMethod {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            "overnight" => Ok(Self::Overnight),
            _ => Err(PricingError::UnknownShippingMethod(s.to_string())),
        }
    }
}

/// Shipping cost for a method and optional parcel weight in kilograms.
///
/// Each started 10 kg bracket adds 2 to the base rate. A missing or zero
/// weight adds nothing.
///
/// # Errors
///
/// Returns [`PricingError::InvalidWeight`] for a negative weight.
pub fn shipping_cost(
    method: ShippingMethod,
    weight_kg: Option<Decimal>,
) -> Result<Decimal, PricingError> {
    let surcharge = match weight_kg {
        Some(weight) if weight.is_sign_negative() && !weight.is_zero() => {
            return Err(PricingError::InvalidWeight(weight));
        }
        Some(weight) if weight > Decimal::ZERO => {
            (weight / SURCHARGE_STEP_KG).ceil() * SURCHARGE_PER_STEP
        }
        _ => Decimal::ZERO,
    };

    Ok(method.base_rate() + surcharge)
}

/// Shipping cost for a method given as a string, as received from a form or
/// query parameter.
///
/// # Errors
///
/// Returns [`PricingError::UnknownShippingMethod`] when the method is not
/// recognized, or [`PricingError::InvalidWeight`] for a negative weight.
pub fn shipping_cost_for(
    method: &str,
    weight_kg: Option<Decimal>,
) -> Result<Decimal, PricingError> {
    shipping_cost(method.parse()?, weight_kg)
}

/// Tax owed on a subtotal at the flat [`TAX_RATE`], rounded to cents.
#[must_use]
pub fn tax_amount(subtotal: Decimal) -> Decimal {
    (subtotal * TAX_RATE).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// How a coupon's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// `value` is a percentage of the subtotal.
    Percentage,
    /// `value` is a fixed amount off.
    Fixed,
}

/// A discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    /// Subtotal the cart must reach before the coupon applies.
    #[serde(default)]
    pub min_subtotal: Option<Decimal>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl Coupon {
    /// Discount this coupon grants on `subtotal` at time `now`.
    ///
    /// Zero when the coupon is inactive, expired, or the subtotal is below the
    /// minimum. The discount never exceeds the subtotal.
    #[must_use]
    pub fn discount_for(&self, subtotal: Decimal, now: DateTime<Utc>) -> Decimal {
        if !self.active || self.value <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        if self.expires_at.is_some_and(|expires| expires <= now) {
            return Decimal::ZERO;
        }
        if self.min_subtotal.is_some_and(|min| subtotal < min) {
            return Decimal::ZERO;
        }

        let discount = match self.kind {
            // A product too large to represent is larger than the subtotal.
            CouponKind::Percentage => subtotal
                .checked_mul(self.value / Decimal::ONE_HUNDRED)
                .map_or(subtotal, |discount| {
                    discount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                }),
            CouponKind::Fixed => self.value,
        };

        discount.min(subtotal)
    }
}

/// Optional checkout choices that affect the order total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutOptions {
    /// Shipping tier and parcel weight in kilograms.
    pub shipping: Option<(ShippingMethod, Option<Decimal>)>,
    pub coupon: Option<Coupon>,
}

/// Breakdown of an order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: u64,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Combine a subtotal with tax, shipping and coupon.
    ///
    /// Tax is charged on the undiscounted subtotal.
    ///
    /// # Errors
    ///
    /// Propagates shipping validation errors, and returns
    /// [`PricingError::AmountOverflow`] if the total cannot be represented.
    pub fn compute(
        item_count: u64,
        subtotal: Decimal,
        options: &CheckoutOptions,
        now: DateTime<Utc>,
    ) -> Result<Self, PricingError> {
        let tax = tax_amount(subtotal);
        let shipping = match options.shipping {
            Some((method, weight)) => shipping_cost(method, weight)?,
            None => Decimal::ZERO,
        };
        let discount = options
            .coupon
            .as_ref()
            .map_or(Decimal::ZERO, |coupon| coupon.discount_for(subtotal, now));

        let total = (subtotal - discount)
            .checked_add(tax)
            .and_then(|total| total.checked_add(shipping))
            .ok_or(PricingError::AmountOverflow)?;

        Ok(Self {
            item_count,
            subtotal,
            tax,
            shipping,
            discount,
            total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_standard_base_rate_without_weight() {
        assert_eq!(
            shipping_cost(ShippingMethod::Standard, None).unwrap(),
            dec("5")
        );
        assert_eq!(shipping_cost_for("standard", None).unwrap(), dec("5"));
    }

    #[test]
    fn test_tier_base_rates() {
        assert_eq!(shipping_cost_for("express", None).unwrap(), dec("15"));
        assert_eq!(shipping_cost_for("overnight", None).unwrap(), dec("30"));
    }

    #[test]
    fn test_unknown_method_is_validation_error() {
        assert_eq!(
            shipping_cost_for("teleport", None),
            Err(PricingError::UnknownShippingMethod("teleport".to_string()))
        );
    }

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!(
            "Express".parse::<ShippingMethod>().unwrap(),
            ShippingMethod::Express
        );
    }

    #[test]
    fn test_weight_surcharge_steps() {
        let cost = |w: &str| shipping_cost(ShippingMethod::Standard, Some(dec(w))).unwrap();
        assert_eq!(cost("0"), dec("5"));
        assert_eq!(cost("0.5"), dec("7"));
        assert_eq!(cost("10"), dec("7"));
        assert_eq!(cost("10.1"), dec("9"));
        assert_eq!(cost("25"), dec("11"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert!(matches!(
            shipping_cost(ShippingMethod::Express, Some(dec("-1"))),
            Err(PricingError::InvalidWeight(_))
        ));
    }

    #[test]
    fn test_tax_is_ten_percent_rounded() {
        assert_eq!(tax_amount(dec("6.00")), dec("0.60"));
        assert_eq!(tax_amount(dec("0.05")), dec("0.01"));
        assert_eq!(tax_amount(Decimal::ZERO), Decimal::ZERO);
    }

    fn coupon(kind: CouponKind, value: &str) -> Coupon {
        Coupon {
            code: "WELCOME".to_string(),
            kind,
            value: dec(value),
            min_subtotal: None,
            expires_at: None,
            active: true,
        }
    }

    #[test]
    fn test_percentage_coupon() {
        let now = Utc::now();
        assert_eq!(
            coupon(CouponKind::Percentage, "15").discount_for(dec("40"), now),
            dec("6.00")
        );
    }

    #[test]
    fn test_fixed_coupon_capped_at_subtotal() {
        let now = Utc::now();
        assert_eq!(
            coupon(CouponKind::Fixed, "50").discount_for(dec("20"), now),
            dec("20")
        );
    }

    #[test]
    fn test_coupon_respects_minimum_and_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap();

        let mut c = coupon(CouponKind::Fixed, "5");
        c.min_subtotal = Some(dec("30"));
        assert_eq!(c.discount_for(dec("29.99"), now), Decimal::ZERO);
        assert_eq!(c.discount_for(dec("30"), now), dec("5"));

        c.expires_at = Some(Utc.with_ymd_and_hms(2025, 10, 31, 0, 0, 0).unwrap());
        assert_eq!(c.discount_for(dec("100"), now), Decimal::ZERO);
    }

    #[test]
    fn test_inactive_coupon() {
        let mut c = coupon(CouponKind::Percentage, "10");
        c.active = false;
        assert_eq!(c.discount_for(dec("100"), Utc::now()), Decimal::ZERO);
    }

    #[test]
    fn test_totals_combine_parts() {
        let options = CheckoutOptions {
            shipping: Some((ShippingMethod::Standard, None)),
            coupon: Some(coupon(CouponKind::Fixed, "1")),
        };
        let totals = CartTotals::compute(3, dec("6.00"), &options, Utc::now()).unwrap();
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.tax, dec("0.60"));
        assert_eq!(totals.shipping, dec("5"));
        assert_eq!(totals.discount, dec("1"));
        assert_eq!(totals.total, dec("10.60"));
    }

    #[test]
    fn test_huge_percentage_capped_at_subtotal() {
        let c = coupon(CouponKind::Percentage, "79228162514264337593543950335");
        assert_eq!(c.discount_for(dec("1000"), Utc::now()), dec("1000"));
    }

    #[test]
    fn test_totals_overflow_reported() {
        let options = CheckoutOptions {
            shipping: Some((ShippingMethod::Overnight, None)),
            coupon: None,
        };
        assert_eq!(
            CartTotals::compute(1, Decimal::MAX, &options, Utc::now()),
            Err(PricingError::AmountOverflow)
        );
    }
}
