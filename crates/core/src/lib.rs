//! Ekagra Core - Shared types library.
//!
//! This crate provides common types used across Ekagra components:
//! - `site` - Public-facing marketing site and book purchase flow
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for prices, emails, phone numbers, and
//!   payment-provider identifiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
