//! Cart quote handler.
//!
//! The cart itself lives on the client. The client posts its lines and the
//! server replays them through a transient [`CartStore`] so that merging,
//! validation and totals follow exactly the same rules as everywhere else.

use axum::Json;
use maxfood_core::{
    CartItem, CartStore, CartTotals, CheckoutOptions, Coupon, Locale, MemoryPersistence, Price,
    ShippingMethod,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};

/// Maximum number of lines accepted in one quote request.
const MAX_QUOTE_LINES: usize = 100;

/// Shipping selection in a quote request.
#[derive(Debug, Deserialize)]
pub struct ShippingSelection {
    pub method: String,
    /// Parcel weight in kilograms.
    #[serde(default)]
    pub weight: Option<Decimal>,
}

/// Request body for `POST /api/cart/quote`.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub shipping: Option<ShippingSelection>,
    #[serde(default)]
    pub coupon: Option<Coupon>,
    /// Locale whose currency is used for display strings.
    #[serde(default)]
    pub locale: Option<String>,
}

/// Display strings for the totals in the locale's currency.
#[derive(Debug, Serialize)]
pub struct TotalsDisplay {
    pub subtotal: String,
    pub tax: String,
    pub shipping: String,
    pub discount: String,
    pub total: String,
}

impl TotalsDisplay {
    fn new(totals: &CartTotals, locale: Locale) -> Self {
        let fmt = |amount| Price::new(amount, locale.currency()).display();
        Self {
            subtotal: fmt(totals.subtotal),
            tax: fmt(totals.tax),
            shipping: fmt(totals.shipping),
            discount: fmt(totals.discount),
            total: fmt(totals.total),
        }
    }
}

/// Response body for a cart quote.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    /// Lines after merging duplicate product ids.
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    pub display: TotalsDisplay,
}

/// Price a client-held cart.
///
/// Product ids are trimmed, so `"A"` and `" A"` merge into one line.
///
/// # Errors
///
/// Returns 400 if a line is invalid, the shipping selection is rejected, or
/// too many lines are posted. Returns 404 for an unsupported locale.
#[instrument(skip(request), fields(lines = request.items.len()))]
pub async fn quote(Json(request): Json<QuoteRequest>) -> Result<Json<QuoteResponse>> {
    if request.items.len() > MAX_QUOTE_LINES {
        return Err(AppError::BadRequest(format!(
            "at most {MAX_QUOTE_LINES} lines per quote"
        )));
    }

    let locale = request
        .locale
        .as_deref()
        .map(str::parse::<Locale>)
        .transpose()?
        .unwrap_or_default();

    let shipping = request
        .shipping
        .map(|selection| {
            selection
                .method
                .parse::<ShippingMethod>()
                .map(|method| (method, selection.weight))
        })
        .transpose()?;

    let mut store = CartStore::open(MemoryPersistence::new());
    for item in request.items {
        store.add_item(item)?;
    }

    let options = CheckoutOptions {
        shipping,
        coupon: request.coupon,
    };
    let totals = store.totals(&options)?;

    add_breadcrumb(
        "cart",
        "Quoted cart",
        &[
            ("items", totals.item_count.to_string()),
            ("total", totals.total.to_string()),
        ],
    );

    Ok(Json(QuoteResponse {
        items: store.items().to_vec(),
        display: TotalsDisplay::new(&totals, locale),
        totals,
    }))
}
