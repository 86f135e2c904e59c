//! The book format catalog.
//!
//! "Steady Ground" ships in three formats. This is the only purchasable
//! catalog on the site, kept in code: the formats change a few times a year
//! at most, together with a deploy.

use ekagra_core::{CurrencyCode, Price};
use serde::{Deserialize, Serialize};

/// Identifier for a purchasable book format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFormatId {
    Ebook,
    Paperback,
    Hardcover,
}

impl BookFormatId {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ebook => "ebook",
            Self::Paperback => "paperback",
            Self::Hardcover => "hardcover",
        }
    }
}

impl std::str::FromStr for BookFormatId {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ebook" => Ok(Self::Ebook),
            "paperback" => Ok(Self::Paperback),
            "hardcover" => Ok(Self::Hardcover),
            other => Err(UnknownFormat(other.to_owned())),
        }
    }
}

impl std::fmt::Display for BookFormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned for a format slug not in the catalog.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown book format: {0}")]
pub struct UnknownFormat(pub String);

/// A purchasable edition of the book.
#[derive(Debug, Clone)]
pub struct BookFormat {
    pub id: BookFormatId,
    /// Display label, also the item name shown in the checkout modal.
    pub label: String,
    pub description: String,
    pub price: Price,
}

impl BookFormat {
    /// The full catalog, cheapest first.
    #[must_use]
    pub fn all() -> Vec<Self> {
        vec![
            Self {
                id: BookFormatId::Ebook,
                label: "Ebook Edition".to_string(),
                description: "Instant download in EPUB and PDF, readable everywhere.".to_string(),
                price: price_inr(49_900),
            },
            Self {
                id: BookFormatId::Paperback,
                label: "Paperback Edition".to_string(),
                description: "The travel-friendly paperback, shipped anywhere in India."
                    .to_string(),
                price: price_inr(120_000),
            },
            Self {
                id: BookFormatId::Hardcover,
                label: "Hardcover Edition".to_string(),
                description: "Cloth-bound hardcover with the companion journal pages."
                    .to_string(),
                price: price_inr(200_000),
            },
        ]
    }

    /// Look up a format by its id.
    #[must_use]
    pub fn find(id: BookFormatId) -> Self {
        Self::all()
            .into_iter()
            .find(|format| format.id == id)
            .unwrap_or_else(|| unreachable!("catalog covers every BookFormatId"))
    }
}

/// Catalog prices are fixed positive constants; the fallible constructor
/// cannot fail for them.
fn price_inr(amount_minor: i64) -> Price {
    Price::from_minor(amount_minor, CurrencyCode::Inr)
        .unwrap_or_else(|_| unreachable!("catalog prices are positive"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_id() {
        for id in [
            BookFormatId::Ebook,
            BookFormatId::Paperback,
            BookFormatId::Hardcover,
        ] {
            assert_eq!(BookFormat::find(id).id, id);
        }
    }

    #[test]
    fn test_hardcover_price_in_minor_units() {
        let hardcover = BookFormat::find(BookFormatId::Hardcover);
        assert_eq!(hardcover.label, "Hardcover Edition");
        assert_eq!(hardcover.price.amount_minor(), 200_000);
        assert_eq!(hardcover.price.display(), "₹2,000.00");
    }

    #[test]
    fn test_format_slug_roundtrip() {
        for format in BookFormat::all() {
            let parsed: BookFormatId = format.id.as_str().parse().unwrap();
            assert_eq!(parsed, format.id);
        }
        assert!("audiobook".parse::<BookFormatId>().is_err());
    }
}
