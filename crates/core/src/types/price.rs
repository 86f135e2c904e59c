//! Type-safe price representation in integer minor currency units.
//!
//! Monetary amounts are carried as whole numbers of the currency's smallest
//! denomination (paise for INR, cents for USD) so that no floating-point
//! arithmetic ever touches a price. Decimal conversion happens only at the
//! display boundary.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum PriceError {
    /// The amount is zero or negative.
    #[error("price must be a positive number of minor units (got {0})")]
    NotPositive(i64),
}

/// A monetary amount in integer minor currency units.
///
/// ## Examples
///
/// ```
/// use ekagra_core::{CurrencyCode, Price};
///
/// let price = Price::from_minor(200_000, CurrencyCode::Inr).unwrap();
/// assert_eq!(price.amount_minor(), 200_000);
/// assert_eq!(price.display(), "₹2,000.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the smallest currency unit (e.g., paise for INR).
    amount_minor: i64,
    /// ISO 4217 currency code.
    currency: CurrencyCode,
}

impl Price {
    /// Create a price from a positive number of minor units.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] if `amount_minor` is zero or
    /// negative.
    pub const fn from_minor(amount_minor: i64, currency: CurrencyCode) -> Result<Self, PriceError> {
        if amount_minor <= 0 {
            return Err(PriceError::NotPositive(amount_minor));
        }
        Ok(Self {
            amount_minor,
            currency,
        })
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn amount_minor(&self) -> i64 {
        self.amount_minor
    }

    /// The price's currency.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Format for display with the currency symbol and digit grouping
    /// (e.g., `₹2,000.00`). INR uses lakh/crore grouping.
    #[must_use]
    pub fn display(&self) -> String {
        let decimal = Decimal::new(self.amount_minor, u32::from(self.currency.minor_digits()));
        let rendered = decimal.to_string();
        let (integer, fraction) = rendered
            .split_once('.')
            .map_or((rendered.as_str(), ""), |(i, f)| (i, f));

        let grouped = match self.currency {
            CurrencyCode::Inr => group_indian(integer),
            _ => group_thousands(integer),
        };

        if fraction.is_empty() {
            let width = usize::from(self.currency.minor_digits());
            format!("{}{}.{:0<width$}", self.currency.symbol(), grouped, "")
        } else {
            format!("{}{}.{}", self.currency.symbol(), grouped, fraction)
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Group an integer string in threes: `1234567` -> `1,234,567`.
fn group_thousands(digits: &str) -> String {
    group_from_right(digits, |position| position % 3 == 0)
}

/// Group an integer string in the Indian style: `1234567` -> `12,34,567`
/// (last three digits, then pairs).
fn group_indian(digits: &str) -> String {
    group_from_right(digits, |position| {
        position == 3 || (position > 3 && (position - 3) % 2 == 0)
    })
}

fn group_from_right(digits: &str, separator_at: impl Fn(usize) -> bool) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);
    let count = digits.chars().filter(char::is_ascii_digit).count();
    let mut seen = 0;
    for c in digits.chars() {
        if c.is_ascii_digit() {
            let remaining = count - seen;
            if seen > 0 && separator_at(remaining) {
                grouped.push(',');
            }
            seen += 1;
        }
        grouped.push(c);
    }
    grouped
}

/// ISO 4217 currency codes supported by the checkout surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[default]
    Inr,
    Usd,
    Eur,
    Gbp,
}

impl CurrencyCode {
    /// The ISO 4217 alphabetic code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }

    /// The display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Inr => "₹",
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
        }
    }

    /// Number of minor-unit digits (all supported currencies use two).
    #[must_use]
    pub const fn minor_digits(&self) -> u8 {
        2
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::Inr),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            other => Err(UnknownCurrency(other.to_owned())),
        }
    }
}

/// Error returned when parsing an unsupported currency code.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_rejects_non_positive() {
        assert!(matches!(
            Price::from_minor(0, CurrencyCode::Inr),
            Err(PriceError::NotPositive(0))
        ));
        assert!(matches!(
            Price::from_minor(-500, CurrencyCode::Inr),
            Err(PriceError::NotPositive(-500))
        ));
    }

    #[test]
    fn test_display_inr_grouping() {
        let price = Price::from_minor(200_000, CurrencyCode::Inr).unwrap();
        assert_eq!(price.display(), "₹2,000.00");

        let lakh = Price::from_minor(10_000_000, CurrencyCode::Inr).unwrap();
        assert_eq!(lakh.display(), "₹1,00,000.00");
    }

    #[test]
    fn test_display_western_grouping() {
        let price = Price::from_minor(123_456_789, CurrencyCode::Usd).unwrap();
        assert_eq!(price.display(), "$1,234,567.89");
    }

    #[test]
    fn test_display_small_amounts() {
        let price = Price::from_minor(50, CurrencyCode::Inr).unwrap();
        assert_eq!(price.display(), "₹0.50");

        let price = Price::from_minor(49_900, CurrencyCode::Inr).unwrap();
        assert_eq!(price.display(), "₹499.00");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("inr".parse::<CurrencyCode>().unwrap(), CurrencyCode::Inr);
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::Usd);
        assert!("JPY".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_serde_currency_uppercase() {
        let json = serde_json::to_string(&CurrencyCode::Inr).unwrap();
        assert_eq!(json, "\"INR\"");
    }
}
