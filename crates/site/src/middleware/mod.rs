//! HTTP middleware for the site.
//!
//! Requests pass through, in order: the Sentry layers, `TraceLayer`,
//! request id propagation, CSP nonce minting, and finally the security
//! header pass that reads the nonce. The header pass must sit innermost
//! so the nonce already exists when the CSP value is built.

pub mod csp;
pub mod request_id;
pub mod security_headers;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
