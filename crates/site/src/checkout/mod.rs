//! Hosted-checkout purchase flow.
//!
//! This module owns the one piece of non-trivial orchestration on the site:
//! sequencing the payment provider's hosted checkout for a single book
//! purchase attempt.
//!
//! # Structure
//!
//! - [`catalog`] - The book format catalog (the only purchasable items)
//! - [`gateway`] - The [`PaymentGateway`] capability the orchestrator drives
//! - [`orchestrator`] - Sequences load -> configure -> modal -> outcome
//! - [`razorpay`] - Production gateway against the Razorpay Orders API
//! - [`pending`] - In-memory registry bridging HTTP callbacks to attempts
//! - [`validate`] - Shipping-address validation
//! - [`flow`] - The page-level purchase state machine
//!
//! The orchestrator never talks to the provider directly; it only sees the
//! `PaymentGateway` trait, so the whole control flow is unit-testable with a
//! scripted gateway and no network access.

pub mod catalog;
pub mod flow;
pub mod gateway;
pub mod orchestrator;
pub mod pending;
pub mod razorpay;
pub mod validate;

use std::collections::BTreeMap;

use ekagra_core::{CurrencyCode, OrderId, PaymentId};
use serde::{Deserialize, Serialize};

pub use catalog::{BookFormat, BookFormatId};
pub use flow::{CompletedPurchase, Notice, PurchaseFlow, Stage, Submission};
pub use gateway::{GatewayError, ModalOptions, ModalOutcome, PaymentGateway};
pub use orchestrator::{CheckoutDefaults, CheckoutOrchestrator};
pub use pending::{CallbackEvent, HostedCheckout, PendingPayments};
pub use razorpay::RazorpayGateway;
pub use validate::{ShippingInfo, ValidationErrorMap, validate};

/// Buyer details prefilled into the hosted checkout modal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyerPrefill {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Outcome of a completed payment, as reported by the provider.
///
/// The signature is informational only; this site does not verify it
/// (there is no server-side order store to reconcile against).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub payment_id: PaymentId,
    pub order_id: Option<OrderId>,
    pub signature: Option<String>,
}

/// Why a checkout attempt did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The provider's checkout runtime could not be reached; no modal was
    /// shown.
    GatewayUnavailable,
    /// The buyer closed the modal without paying. Not an error: callers
    /// stay silent on this one.
    Dismissed,
    /// The provider reported a failure (declined, misconfigured, transport).
    Rejected {
        /// Provider-supplied description, when one was given.
        message: Option<String>,
    },
}

impl FailureReason {
    /// Whether this is a buyer-initiated dismissal.
    #[must_use]
    pub const fn is_dismissal(&self) -> bool {
        matches!(self, Self::Dismissed)
    }

    /// The user-facing notice for this failure, or `None` when the failure
    /// should stay silent (dismissal).
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        match self {
            Self::Dismissed => None,
            Self::GatewayUnavailable => {
                Some("Checkout is unavailable right now. Please try again in a moment.".to_string())
            }
            Self::Rejected { message } => Some(message.clone().unwrap_or_else(|| {
                "Payment could not be completed. You have not been charged; please try again."
                    .to_string()
            })),
        }
    }
}

/// Callback fired exactly once when a payment completes.
pub type SuccessHandler = Box<dyn FnOnce(PaymentResult) + Send>;

/// Callback fired exactly once when a checkout attempt ends any other way.
pub type FailureHandler = Box<dyn FnOnce(FailureReason) + Send>;

/// One purchase attempt, constructed fresh per attempt and consumed by
/// [`CheckoutOrchestrator::open_checkout`].
///
/// A `CheckoutRequest` is only ever built from a [`ShippingInfo`] that
/// passed [`validate`]; the flow machine enforces this.
pub struct CheckoutRequest {
    /// Amount in integer minor currency units; must be positive.
    pub amount_minor: i64,
    /// Currency override; the configured default applies when `None`.
    pub currency: Option<CurrencyCode>,
    /// Short item name shown in the modal (e.g., "Hardcover Edition").
    pub item_label: String,
    /// Longer item description.
    pub item_description: String,
    /// Buyer details prefilled into the modal.
    pub prefill: BuyerPrefill,
    /// Free-form metadata attached to the transaction for reconciliation.
    pub notes: BTreeMap<String, String>,
    /// Accent color override; the brand constant applies when `None`.
    pub accent_color: Option<String>,
    /// Fired on completed payment.
    pub on_success: SuccessHandler,
    /// Fired on every other exit path, exactly once.
    pub on_failure: FailureHandler,
}

impl std::fmt::Debug for CheckoutRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutRequest")
            .field("amount_minor", &self.amount_minor)
            .field("currency", &self.currency)
            .field("item_label", &self.item_label)
            .field("notes", &self.notes)
            .finish_non_exhaustive()
    }
}
