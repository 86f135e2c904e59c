//! Environment-driven configuration.
//!
//! All settings come from the process environment (a `.env` file is
//! honored in development). Recognized variables:
//!
//! - `SITE_HOST` / `SITE_PORT` - bind address (default `127.0.0.1:3000`)
//! - `SITE_BASE_URL` - canonical origin for absolute links
//! - `SITE_CONTENT_DIR` - markdown content root
//! - `SITE_PREFS_PATH` - optional JSON file backing visitor preferences
//! - `RAZORPAY_KEY_ID` / `RAZORPAY_KEY_SECRET` - payment credentials
//! - `CHECKOUT_CURRENCY` / `CHECKOUT_ACCENT_COLOR` - checkout defaults
//! - `SENTRY_DSN` / `SENTRY_ENVIRONMENT` - error reporting

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use ekagra_core::CurrencyCode;
use secrecy::{ExposeSecret as _, SecretString};
use thiserror::Error;
use url::Url;

/// Brand name used in page titles and the checkout modal.
pub const BRAND_NAME: &str = "Ekagra";

/// Publishable key id used when none is configured. Checkout renders but
/// the provider rejects it, which is the right failure mode for dev.
pub const PLACEHOLDER_KEY_ID: &str = "rzp_test_placeholder";

/// Brand accent applied to the checkout modal unless overridden.
pub const DEFAULT_ACCENT_COLOR: &str = "#c2410c";

/// Secrets below this Shannon entropy (bits per character) are refused.
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a secret as a template value rather than a real
/// credential.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Top-level site configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub content_dir: PathBuf,
    pub prefs_path: Option<PathBuf>,
    pub checkout: CheckoutConfig,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl SiteConfig {
    /// Build configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable fails to parse or the
    /// payment secret fails the strength check.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is the normal case in production.
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SITE_HOST", "127.0.0.1");
        let host: IpAddr = host
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), host.clone()))?;

        let port = get_env_or_default("SITE_PORT", "3000");
        let port: u16 = port
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), port.clone()))?;

        let base_url = get_env_or_default("SITE_BASE_URL", "http://localhost:3000");
        Url::parse(&base_url)
            .map_err(|_| ConfigError::InvalidEnvVar("SITE_BASE_URL".to_string(), base_url.clone()))?;

        Ok(Self {
            host,
            port,
            base_url,
            content_dir: PathBuf::from(get_env_or_default(
                "SITE_CONTENT_DIR",
                "crates/site/content",
            )),
            prefs_path: get_optional_env("SITE_PREFS_PATH").map(PathBuf::from),
            checkout: CheckoutConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            content_dir: PathBuf::from("crates/site/content"),
            prefs_path: None,
            checkout: CheckoutConfig {
                key_id: PLACEHOLDER_KEY_ID.to_string(),
                key_secret: None,
                currency: CurrencyCode::Inr,
                accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

/// Payment-provider settings for the hosted checkout.
#[derive(Clone)]
pub struct CheckoutConfig {
    /// Publishable key id; safe to embed in pages.
    pub key_id: String,
    /// API secret for server-side order creation. Optional so the site
    /// can run without credentials in development.
    pub key_secret: Option<SecretString>,
    /// Default transaction currency.
    pub currency: CurrencyCode,
    /// Checkout modal accent color.
    pub accent_color: String,
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let key_secret = match get_optional_env("RAZORPAY_KEY_SECRET") {
            Some(raw) => {
                validate_secret_strength("RAZORPAY_KEY_SECRET", &raw)?;
                Some(SecretString::from(raw))
            }
            None => None,
        };

        let currency = get_env_or_default("CHECKOUT_CURRENCY", "INR");
        let currency: CurrencyCode = currency.parse().map_err(|_| {
            ConfigError::InvalidEnvVar("CHECKOUT_CURRENCY".to_string(), currency.clone())
        })?;

        Ok(Self {
            key_id: get_env_or_default("RAZORPAY_KEY_ID", PLACEHOLDER_KEY_ID),
            key_secret,
            currency,
            accent_color: get_env_or_default("CHECKOUT_ACCENT_COLOR", DEFAULT_ACCENT_COLOR),
        })
    }

    /// The raw secret, or an empty string when none is configured. The
    /// provider rejects the empty credential and the failure surfaces
    /// through the normal checkout error path.
    #[must_use]
    pub fn exposed_secret(&self) -> &str {
        self.key_secret
            .as_ref()
            .map_or("", |secret| secret.expose_secret())
    }
}

impl fmt::Debug for CheckoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutConfig")
            .field("key_id", &self.key_id)
            .field(
                "key_secret",
                &self.key_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("currency", &self.currency)
            .field("accent_color", &self.accent_color)
            .finish()
    }
}

fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn get_env_or_default(name: &str, default: &str) -> String {
    get_optional_env(name).unwrap_or_else(|| default.to_string())
}

/// Shannon entropy of the string, in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    let mut counts = std::collections::HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_insert(0u32) += 1;
    }
    #[allow(clippy::cast_precision_loss)]
    let total = s.chars().count() as f64;
    counts
        .values()
        .map(|&count| {
            let p = f64::from(count) / total;
            -p * p.log2()
        })
        .sum()
}

/// Refuse secrets that look like template placeholders or carry too
/// little entropy to be real credentials.
fn validate_secret_strength(name: &str, value: &str) -> Result<(), ConfigError> {
    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_string(),
                format!("looks like a placeholder (contains {pattern:?})"),
            ));
        }
    }
    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            format!("entropy too low ({entropy:.2} bits/char)"),
        ));
    }
    Ok(())
}
