//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty after trimming.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input string is too short after trimming.
    #[error("phone number must be at least {min} characters")]
    TooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

/// A buyer's phone number.
///
/// Validation is intentionally loose: anything at least ten characters long
/// after trimming is accepted, so `+91 98765 43210` and `9876543210` both
/// pass. The payment provider performs its own normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum length of a phone number after trimming.
    pub const MIN_LENGTH: usize = 10;

    /// Parse a `PhoneNumber` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or shorter than
    /// [`Self::MIN_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }
        if trimmed.chars().count() < Self::MIN_LENGTH {
            return Err(PhoneError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        assert!(PhoneNumber::parse("9876543210").is_ok());
        assert!(PhoneNumber::parse("+91 98765 43210").is_ok());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let phone = PhoneNumber::parse("  9876543210  ").unwrap();
        assert_eq!(phone.as_str(), "9876543210");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(PhoneNumber::parse("   "), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(
            PhoneNumber::parse("98765"),
            Err(PhoneError::TooShort { min: 10 })
        ));
    }
}
