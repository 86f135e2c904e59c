//! Core types for Ekagra.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{PhoneError, PhoneNumber};
pub use price::{CurrencyCode, Price, PriceError, UnknownCurrency};
