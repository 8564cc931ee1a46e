//! Supported site locales.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::price::CurrencyCode;

/// Errors that can occur when parsing a [`Locale`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    /// The code is not one of the eight supported locales.
    #[error("unsupported locale: {0}")]
    Unsupported(String),
}

/// One of the eight language/region identifiers the site is published in.
///
/// Serialized as the lowercase ISO 639-1 code (`"en"`, `"sv"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Es,
    Sv,
    #[default]
    En,
    Fr,
    De,
    Ar,
    Zh,
    Ja,
}

impl Locale {
    /// Every supported locale, in navigation order.
    pub const ALL: [Self; 8] = [
        Self::Es,
        Self::Sv,
        Self::En,
        Self::Fr,
        Self::De,
        Self::Ar,
        Self::Zh,
        Self::Ja,
    ];

    /// The lowercase locale code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::Sv => "sv",
            Self::En => "en",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Ar => "ar",
            Self::Zh => "zh",
            Self::Ja => "ja",
        }
    }

    /// The locale's name in its own language.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Es => "Español",
            Self::Sv => "Svenska",
            Self::En => "English",
            Self::Fr => "Français",
            Self::De => "Deutsch",
            Self::Ar => "العربية",
            Self::Zh => "中文",
            Self::Ja => "日本語",
        }
    }

    /// Whether text in this locale is laid out right-to-left.
    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Ar)
    }

    /// The currency prices are shown in for this locale.
    #[must_use]
    pub const fn currency(self) -> CurrencyCode {
        match self {
            Self::Es | Self::Fr | Self::De => CurrencyCode::EUR,
            Self::Sv => CurrencyCode::SEK,
            Self::En => CurrencyCode::GBP,
            Self::Ar => CurrencyCode::SAR,
            Self::Zh => CurrencyCode::CNY,
            Self::Ja => CurrencyCode::JPY,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|locale| locale.as_str() == code)
            .ok_or_else(|| LocaleError::Unsupported(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_locale() {
        for locale in Locale::ALL {
            assert_eq!(locale.as_str().parse::<Locale>().unwrap(), locale);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("SV".parse::<Locale>().unwrap(), Locale::Sv);
        assert_eq!(" ja ".parse::<Locale>().unwrap(), Locale::Ja);
    }

    #[test]
    fn test_parse_unsupported() {
        assert_eq!(
            "pt".parse::<Locale>(),
            Err(LocaleError::Unsupported("pt".to_string()))
        );
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(Locale::default(), Locale::En);
    }

    #[test]
    fn test_only_arabic_is_rtl() {
        let rtl: Vec<Locale> = Locale::ALL.into_iter().filter(|l| l.is_rtl()).collect();
        assert_eq!(rtl, vec![Locale::Ar]);
    }

    #[test]
    fn test_currency_by_locale() {
        assert_eq!(Locale::Sv.currency(), CurrencyCode::SEK);
        assert_eq!(Locale::De.currency(), CurrencyCode::EUR);
        assert_eq!(Locale::Ja.currency(), CurrencyCode::JPY);
    }

    #[test]
    fn test_serde_uses_code() {
        assert_eq!(serde_json::to_string(&Locale::Zh).unwrap(), "\"zh\"");
        let parsed: Locale = serde_json::from_str("\"fr\"").unwrap();
        assert_eq!(parsed, Locale::Fr);
    }
}
