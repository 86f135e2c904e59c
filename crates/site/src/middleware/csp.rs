//! Per-request CSP nonce generation.
//!
//! Inline scripts on the checkout pages carry a nonce so the
//! Content-Security-Policy header can allow them without `unsafe-inline`.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::{extract::Request, middleware::Next, response::Response};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore as _;

/// A base64 nonce minted once per request.
#[derive(Clone, Debug)]
pub struct CspNonce(pub String);

impl CspNonce {
    fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Stash a fresh nonce in request extensions so both the CSP header
/// builder and the templates see the same value.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::generate());
    next.run(request).await
}

impl<S: Send + Sync> FromRequestParts<S> for CspNonce {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(nonce) = parts.extensions.get::<Self>() {
            return Ok(nonce.clone());
        }
        // Only reachable when the middleware layer is missing, for
        // example in a handler unit test. An empty nonce blocks the
        // inline script rather than weakening the policy.
        tracing::warn!("request reached a handler without a CSP nonce");
        Ok(Self(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonces_are_unique() {
        let first = CspNonce::generate();
        let second = CspNonce::generate();
        assert_ne!(first.0, second.0);
    }

    #[test]
    fn nonce_decodes_to_sixteen_bytes() {
        let nonce = CspNonce::generate();
        let decoded = STANDARD.decode(nonce.value()).unwrap();
        assert_eq!(decoded.len(), 16);
    }
}
