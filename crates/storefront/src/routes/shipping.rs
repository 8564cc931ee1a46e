//! Shipping rate lookup.

use axum::{Json, extract::Query};
use maxfood_core::pricing::shipping_cost_for;
use maxfood_core::{Locale, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;

/// Query parameters for a shipping quote.
#[derive(Debug, Deserialize)]
pub struct ShippingQuery {
    pub method: String,
    /// Parcel weight in kilograms.
    #[serde(default)]
    pub weight: Option<Decimal>,
    /// Locale whose currency is used for the display string.
    #[serde(default)]
    pub locale: Option<String>,
}

/// Shipping quote response.
#[derive(Debug, Serialize)]
pub struct ShippingQuote {
    pub method: String,
    pub weight: Option<Decimal>,
    pub cost: Decimal,
    pub display: String,
}

/// Quote shipping for a method and optional weight.
///
/// # Errors
///
/// Returns 400 for an unknown method or a negative weight, and 404 for an
/// unsupported locale.
#[instrument]
pub async fn quote(Query(query): Query<ShippingQuery>) -> Result<Json<ShippingQuote>> {
    let locale = query
        .locale
        .as_deref()
        .map(str::parse::<Locale>)
        .transpose()?
        .unwrap_or_default();

    let cost = shipping_cost_for(&query.method, query.weight)?;
    let display = Price::new(cost, locale.currency()).display();

    Ok(Json(ShippingQuote {
        method: query.method.trim().to_ascii_lowercase(),
        weight: query.weight,
        cost,
        display,
    }))
}
