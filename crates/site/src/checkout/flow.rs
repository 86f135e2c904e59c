//! Page-level purchase state machine.
//!
//! Tracks which book format is selected, the shipping form and its errors,
//! the checkout stage, and the last outcome. Transitions are synchronous and
//! infallible; the asynchronous work (the actual checkout attempt) happens
//! outside and reports back through [`PurchaseFlow::complete`] and
//! [`PurchaseFlow::fail`].

use ekagra_core::Price;

use super::catalog::{BookFormat, BookFormatId};
use super::validate::{self, ShippingInfo, ValidationErrorMap};
use super::{FailureReason, PaymentResult};

/// Where one purchase attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Nothing in flight. Selecting a format and editing the form happen
    /// here.
    #[default]
    Idle,
    /// The shipping form is open for this format.
    ModalOpen(BookFormatId),
    /// The form validated and a checkout attempt is in flight.
    Submitting(BookFormatId),
}

/// A finished purchase, kept for the confirmation page.
#[derive(Debug, Clone)]
pub struct CompletedPurchase {
    pub format: BookFormatId,
    pub shipping: ShippingInfo,
    pub result: PaymentResult,
}

/// One-shot user-facing notice, consumed on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// What `submit` decided.
#[derive(Debug)]
pub enum Submission {
    /// Validation failed; the errors are also stored on the flow.
    Blocked(ValidationErrorMap),
    /// Validation passed; start a checkout attempt with this address.
    Proceed(ShippingInfo),
}

/// The purchase flow for the book page. One per site; attempts are serial.
#[derive(Debug, Default)]
pub struct PurchaseFlow {
    stage: Stage,
    shipping: ShippingInfo,
    errors: ValidationErrorMap,
    outcome: Option<CompletedPurchase>,
    notice: Option<Notice>,
}

impl PurchaseFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn stage(&self) -> &Stage {
        &self.stage
    }

    #[must_use]
    pub const fn shipping(&self) -> &ShippingInfo {
        &self.shipping
    }

    #[must_use]
    pub const fn errors(&self) -> &ValidationErrorMap {
        &self.errors
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<&CompletedPurchase> {
        self.outcome.as_ref()
    }

    /// The selected format's price, when a form is open.
    #[must_use]
    pub fn selected_price(&self) -> Option<Price> {
        let (Stage::ModalOpen(format) | Stage::Submitting(format)) = &self.stage else {
            return None;
        };
        Some(BookFormat::find(*format).price)
    }

    /// Open the shipping form for a format, discarding any previous form
    /// state and outcome. Ignored while an attempt is submitting.
    pub fn select_format(&mut self, format: BookFormatId) {
        if matches!(self.stage, Stage::Submitting(_)) {
            return;
        }
        self.stage = Stage::ModalOpen(format);
        self.shipping = ShippingInfo::default();
        self.errors = ValidationErrorMap::default();
        self.outcome = None;
    }

    /// Close the shipping form without submitting. Ignored while submitting.
    pub fn cancel(&mut self) {
        if matches!(self.stage, Stage::Submitting(_)) {
            return;
        }
        self.stage = Stage::Idle;
        self.shipping = ShippingInfo::default();
        self.errors = ValidationErrorMap::default();
    }

    /// Update the form from user input without validating.
    pub fn edit(&mut self, shipping: ShippingInfo) {
        if matches!(self.stage, Stage::ModalOpen(_)) {
            self.shipping = shipping;
        }
    }

    /// Validate the form and, if clean, move to `Submitting`.
    ///
    /// Returns `Blocked` (and keeps the form open with errors shown) or
    /// `Proceed` with the address to check out with. A submit outside
    /// `ModalOpen` is blocked with an empty error map.
    pub fn submit(&mut self) -> Submission {
        let Stage::ModalOpen(format) = self.stage else {
            return Submission::Blocked(ValidationErrorMap::default());
        };

        let errors = validate::validate(&self.shipping);
        if errors.is_empty() {
            self.errors = ValidationErrorMap::default();
            self.stage = Stage::Submitting(format);
            Submission::Proceed(self.shipping.clone())
        } else {
            self.errors = errors.clone();
            Submission::Blocked(errors)
        }
    }

    /// Record a completed payment and return to idle with a success notice.
    ///
    /// A completion with no attempt in flight is logged and dropped; there
    /// is no selected format to record a purchase against.
    pub fn complete(&mut self, result: PaymentResult) {
        let format = match self.stage {
            Stage::Submitting(format) | Stage::ModalOpen(format) => format,
            Stage::Idle => {
                tracing::warn!(payment_id = %result.payment_id, "completion with no attempt in flight, ignoring");
                return;
            }
        };
        self.outcome = Some(CompletedPurchase {
            format,
            shipping: std::mem::take(&mut self.shipping),
            result,
        });
        self.errors = ValidationErrorMap::default();
        self.stage = Stage::Idle;
        self.notice = Some(Notice::Success(
            "Payment received. Thank you for your order!".to_string(),
        ));
    }

    /// Record a failed or dismissed attempt and return to idle.
    ///
    /// Dismissals stay silent; every other failure queues an error notice.
    pub fn fail(&mut self, reason: &FailureReason) {
        self.stage = Stage::Idle;
        if let Some(message) = reason.notice() {
            self.notice = Some(Notice::Error(message));
        }
    }

    /// Take the pending notice, if any. Displayed once, then gone.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ekagra_core::PaymentId;

    use super::*;

    fn filled() -> ShippingInfo {
        ShippingInfo {
            full_name: "Priya Sharma".to_string(),
            email: "priya@example.com".to_string(),
            phone: "9876543210".to_string(),
            address_line1: "14 Lakeview Road".to_string(),
            address_line2: String::new(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            postal_code: "411001".to_string(),
        }
    }

    fn paid() -> PaymentResult {
        PaymentResult {
            payment_id: PaymentId::new("pay_test123"),
            order_id: None,
            signature: None,
        }
    }

    #[test]
    fn test_select_format_opens_a_fresh_form() {
        let mut flow = PurchaseFlow::new();
        flow.select_format(BookFormatId::Hardcover);
        assert_eq!(*flow.stage(), Stage::ModalOpen(BookFormatId::Hardcover));
        assert!(flow.errors().is_empty());
        assert_eq!(*flow.shipping(), ShippingInfo::default());
    }

    #[test]
    fn test_reselecting_discards_previous_form_state() {
        let mut flow = PurchaseFlow::new();
        flow.select_format(BookFormatId::Paperback);
        flow.edit(filled());
        flow.select_format(BookFormatId::Ebook);
        assert_eq!(*flow.shipping(), ShippingInfo::default());
    }

    #[test]
    fn test_invalid_submit_blocks_and_keeps_the_form_open() {
        let mut flow = PurchaseFlow::new();
        flow.select_format(BookFormatId::Hardcover);
        let mut info = filled();
        info.email = "nope".to_string();
        flow.edit(info);

        let Submission::Blocked(errors) = flow.submit() else {
            panic!("expected a blocked submission");
        };
        assert!(!errors.is_empty());
        assert_eq!(*flow.stage(), Stage::ModalOpen(BookFormatId::Hardcover));
        assert!(flow.errors().get("email").is_some());
    }

    #[test]
    fn test_valid_submit_moves_to_submitting() {
        let mut flow = PurchaseFlow::new();
        flow.select_format(BookFormatId::Hardcover);
        flow.edit(filled());

        let Submission::Proceed(shipping) = flow.submit() else {
            panic!("expected validation to pass");
        };
        assert_eq!(shipping, filled());
        assert_eq!(*flow.stage(), Stage::Submitting(BookFormatId::Hardcover));
    }

    #[test]
    fn test_completion_records_outcome_and_queues_success_notice() {
        let mut flow = PurchaseFlow::new();
        flow.select_format(BookFormatId::Hardcover);
        flow.edit(filled());
        let _ = flow.submit();

        flow.complete(paid());
        assert_eq!(*flow.stage(), Stage::Idle);
        let outcome = flow.outcome().unwrap();
        assert_eq!(outcome.format, BookFormatId::Hardcover);
        assert_eq!(outcome.result.payment_id.as_str(), "pay_test123");
        assert!(matches!(flow.take_notice(), Some(Notice::Success(_))));
        assert!(flow.take_notice().is_none());
    }

    #[test]
    fn test_dismissal_is_silent_and_provider_failure_is_not() {
        let mut flow = PurchaseFlow::new();
        flow.select_format(BookFormatId::Ebook);
        flow.edit(filled());
        let _ = flow.submit();

        flow.fail(&FailureReason::Dismissed);
        assert_eq!(*flow.stage(), Stage::Idle);
        assert!(flow.take_notice().is_none());

        flow.select_format(BookFormatId::Ebook);
        flow.edit(filled());
        let _ = flow.submit();
        flow.fail(&FailureReason::Rejected {
            message: Some("Card declined".to_string()),
        });
        assert_eq!(
            flow.take_notice(),
            Some(Notice::Error("Card declined".to_string()))
        );
    }

    #[test]
    fn test_cancel_discards_the_entered_address() {
        let mut flow = PurchaseFlow::new();
        flow.select_format(BookFormatId::Hardcover);
        flow.edit(filled());

        flow.cancel();
        assert_eq!(*flow.stage(), Stage::Idle);
        assert_eq!(*flow.shipping(), ShippingInfo::default());
        assert!(flow.errors().is_empty());
    }

    #[test]
    fn test_stray_completion_without_an_attempt_is_dropped() {
        let mut flow = PurchaseFlow::new();
        flow.complete(paid());
        assert_eq!(*flow.stage(), Stage::Idle);
        assert!(flow.outcome().is_none());
        assert!(flow.take_notice().is_none());
    }

    #[test]
    fn test_submit_outside_an_open_form_is_blocked() {
        let mut flow = PurchaseFlow::new();
        assert!(matches!(flow.submit(), Submission::Blocked(_)));
        assert_eq!(*flow.stage(), Stage::Idle);
    }

    #[test]
    fn test_selection_is_ignored_while_submitting() {
        let mut flow = PurchaseFlow::new();
        flow.select_format(BookFormatId::Hardcover);
        flow.edit(filled());
        let _ = flow.submit();

        flow.select_format(BookFormatId::Ebook);
        assert_eq!(*flow.stage(), Stage::Submitting(BookFormatId::Hardcover));
        flow.cancel();
        assert_eq!(*flow.stage(), Stage::Submitting(BookFormatId::Hardcover));
    }
}
