//! Security headers middleware.
//!
//! Starts from a locked-down policy and admits exactly what the hosted
//! checkout needs: the provider's script origin for `script-src` and
//! `frame-src`, its API origin for `connect-src`, and the per-request nonce
//! for the inline script that boots the modal.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

const CHECKOUT_ORIGIN: &str = "https://checkout.razorpay.com";
const API_ORIGIN: &str = "https://api.razorpay.com";

/// Every browser feature denied outright. `payment` is the one
/// exception, kept for the hosted checkout's Payment Request support.
const DENIED_FEATURES: &[&str] = &[
    "accelerometer",
    "camera",
    "display-capture",
    "geolocation",
    "gyroscope",
    "magnetometer",
    "microphone",
    "midi",
    "usb",
    "xr-spatial-tracking",
];

/// Build the CSP value for one request.
///
/// Inline styles stay blocked; the nonce covers only the checkout
/// bootstrap script.
fn content_security_policy(nonce: &str) -> String {
    [
        "default-src 'none'".to_string(),
        format!("script-src 'self' 'nonce-{nonce}' {CHECKOUT_ORIGIN}"),
        "style-src 'self'".to_string(),
        "font-src 'self'".to_string(),
        "img-src 'self' data:".to_string(),
        format!("connect-src 'self' {API_ORIGIN} {CHECKOUT_ORIGIN}"),
        format!("frame-src {CHECKOUT_ORIGIN} {API_ORIGIN}"),
        "object-src 'none'".to_string(),
        "base-uri 'self'".to_string(),
        "form-action 'self'".to_string(),
        "frame-ancestors 'none'".to_string(),
        "upgrade-insecure-requests".to_string(),
    ]
    .join("; ")
}

fn permissions_policy() -> String {
    let mut directives: Vec<String> = DENIED_FEATURES
        .iter()
        .map(|feature| format!("{feature}=()"))
        .collect();
    directives.push("payment=(self)".to_string());
    directives.join(", ")
}

/// Attach the security header set to every response: frame denial, sniff
/// protection, a no-referrer policy, the per-request CSP, the feature
/// denylist, opener isolation, and DNS prefetch control.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map_or_else(String::new, |n| n.value().to_string());

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

    if let Ok(value) = HeaderValue::from_str(&content_security_policy(&nonce)) {
        headers.insert(CONTENT_SECURITY_POLICY, value);
    }
    if let Ok(value) = HeaderValue::from_str(&permissions_policy()) {
        headers.insert(HeaderName::from_static("permissions-policy"), value);
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csp_carries_the_nonce_and_provider_origins() {
        let csp = content_security_policy("abc123");
        assert!(csp.contains("'nonce-abc123'"));
        assert!(csp.contains("script-src 'self' 'nonce-abc123' https://checkout.razorpay.com"));
        assert!(csp.contains("connect-src 'self' https://api.razorpay.com"));
        assert!(csp.contains("frame-src https://checkout.razorpay.com"));
    }

    #[test]
    fn csp_keeps_the_baseline_locked_down() {
        let csp = content_security_policy("abc123");
        assert!(csp.starts_with("default-src 'none';"));
        assert!(csp.contains("object-src 'none'"));
        assert!(csp.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn permissions_policy_allows_only_payment() {
        let policy = permissions_policy();
        assert!(policy.contains("payment=(self)"));
        assert!(policy.contains("camera=()"));
        assert!(!policy.contains("payment=()"));
    }
}
