//! Shipping-address validation for the book purchase form.
//!
//! Pure field-level checks producing an error map; an empty map means the
//! address is acceptable and checkout may proceed. A `CheckoutRequest` is
//! never constructed from a `ShippingInfo` that failed validation.

use std::collections::BTreeMap;

use ekagra_core::{Email, PhoneNumber};
use serde::{Deserialize, Serialize};

/// Field names, as used for error-map keys and form inputs.
pub mod fields {
    pub const FULL_NAME: &str = "full_name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const ADDRESS_LINE1: &str = "address_line1";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const POSTAL_CODE: &str = "postal_code";
}

/// Minimum postal code length after trimming (6-digit PIN codes, with a
/// little slack for foreign formats).
const MIN_POSTAL_CODE_LENGTH: usize = 5;

/// A buyer's shipping address, mutated field by field as the form is filled
/// in and validated as a whole on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address_line1: String,
    /// Optional; always valid.
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
}

/// Field name -> human-readable message. Empty map ⇔ valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrorMap(BTreeMap<&'static str, String>);

impl ValidationErrorMap {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The message for a field, if that field failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&String> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &String)> {
        self.0.iter().map(|(field, message)| (*field, message))
    }

    fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }
}

/// Validate a shipping address. Pure; no side effects.
///
/// Rules:
/// - `full_name`, `address_line1`, `city`, `state`: non-empty after trimming
/// - `email`: non-empty and a basic `local@domain` shape
/// - `phone`: non-empty and at least 10 characters after trimming
/// - `postal_code`: non-empty and at least 5 characters after trimming
/// - `address_line2`: always valid
#[must_use]
pub fn validate(info: &ShippingInfo) -> ValidationErrorMap {
    let mut errors = ValidationErrorMap::default();

    if info.full_name.trim().is_empty() {
        errors.insert(fields::FULL_NAME, "Please enter your full name.");
    }

    let email = info.email.trim();
    if email.is_empty() {
        errors.insert(fields::EMAIL, "Please enter your email address.");
    } else if Email::parse(email).is_err() {
        errors.insert(fields::EMAIL, "Please enter a valid email address.");
    }

    let phone = info.phone.trim();
    if phone.is_empty() {
        errors.insert(fields::PHONE, "Please enter your phone number.");
    } else if PhoneNumber::parse(phone).is_err() {
        errors.insert(
            fields::PHONE,
            "Phone number must be at least 10 characters.",
        );
    }

    if info.address_line1.trim().is_empty() {
        errors.insert(fields::ADDRESS_LINE1, "Please enter your street address.");
    }

    if info.city.trim().is_empty() {
        errors.insert(fields::CITY, "Please enter your city.");
    }

    if info.state.trim().is_empty() {
        errors.insert(fields::STATE, "Please enter your state.");
    }

    let postal_code = info.postal_code.trim();
    if postal_code.is_empty() {
        errors.insert(fields::POSTAL_CODE, "Please enter your postal code.");
    } else if postal_code.chars().count() < MIN_POSTAL_CODE_LENGTH {
        errors.insert(
            fields::POSTAL_CODE,
            "Postal code must be at least 5 characters.",
        );
    }

    errors
}
