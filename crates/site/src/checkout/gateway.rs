//! The payment gateway capability.
//!
//! The orchestrator drives checkout through this trait rather than loading
//! the provider's script or calling its API directly, so its control flow
//! can be exercised in tests without a network.

use std::collections::BTreeMap;

use ekagra_core::CurrencyCode;

use super::{BuyerPrefill, PaymentResult};

/// Fully-resolved options for one hosted checkout modal, built by the
/// orchestrator from a [`super::CheckoutRequest`] plus configured defaults.
#[derive(Debug, Clone)]
pub struct ModalOptions {
    /// Amount in integer minor currency units; always positive.
    pub amount_minor: i64,
    pub currency: CurrencyCode,
    /// Item name shown in the modal.
    pub label: String,
    pub description: String,
    /// Internal receipt reference forwarded to the provider's order.
    pub receipt: String,
    pub prefill: BuyerPrefill,
    pub notes: BTreeMap<String, String>,
    pub accent_color: String,
}

/// Errors a gateway can report while opening the modal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The provider rejected the attempt and said why.
    #[error("{0}")]
    Provider(String),
    /// The provider could not be reached or answered nonsense.
    #[error("transport error: {0}")]
    Transport(String),
    /// The options were unacceptable before the provider was ever contacted.
    #[error("invalid checkout options: {0}")]
    InvalidOptions(String),
}

/// How one modal interaction ended. Exactly one outcome per attempt.
#[derive(Debug)]
pub enum ModalOutcome {
    /// The buyer paid.
    Completed(PaymentResult),
    /// The buyer closed the modal without paying.
    Dismissed,
    /// The attempt failed before or during payment.
    Failed(GatewayError),
}

/// A hosted payment checkout capability.
pub trait PaymentGateway: Send + Sync {
    /// Ensure the provider's checkout runtime is available.
    ///
    /// Never fails; returns `false` when the runtime cannot be reached.
    /// Idempotent, and concurrent callers share a single in-flight probe. A
    /// successful probe may be cached; a failed probe must not be, so the
    /// next attempt retries.
    fn load(&self) -> impl Future<Output = bool> + Send;

    /// Open the hosted modal for one attempt and report how it ended.
    fn open_modal(&self, options: ModalOptions) -> impl Future<Output = ModalOutcome> + Send;
}
