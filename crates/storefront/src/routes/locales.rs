//! Supported locale listing.

use axum::Json;
use maxfood_core::{CurrencyCode, Locale};
use serde::Serialize;

/// One entry of the locale switcher.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleInfo {
    pub code: Locale,
    pub label: &'static str,
    pub rtl: bool,
    pub currency: CurrencyCode,
    pub is_default: bool,
}

impl From<Locale> for LocaleInfo {
    fn from(locale: Locale) -> Self {
        Self {
            code: locale,
            label: locale.label(),
            rtl: locale.is_rtl(),
            currency: locale.currency(),
            is_default: locale == Locale::default(),
        }
    }
}

/// All supported locales in display order.
pub async fn index() -> Json<Vec<LocaleInfo>> {
    Json(Locale::ALL.into_iter().map(LocaleInfo::from).collect())
}
