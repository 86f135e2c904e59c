//! Ekagra site library.
//!
//! This crate provides the site functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod content;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod prefs;
pub mod routes;
pub mod state;
