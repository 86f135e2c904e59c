//! End-to-end purchase pipeline tests.
//!
//! Wires the purchase flow state machine to the checkout orchestrator the
//! same way the book routes do, with a scripted gateway standing in for the
//! payment provider.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use ekagra_core::PaymentId;
use ekagra_site::checkout::{
    BookFormat, BookFormatId, BuyerPrefill, CheckoutOrchestrator, CheckoutRequest, FailureReason,
    GatewayError, ModalOptions, ModalOutcome, Notice, PaymentGateway, PaymentResult, PurchaseFlow,
    ShippingInfo, Stage, Submission,
};

// =============================================================================
// Test Harness
// =============================================================================

/// Gateway that replays a scripted modal outcome.
struct ScriptedGateway {
    load_ok: bool,
    outcome: Mutex<Option<ModalOutcome>>,
}

impl ScriptedGateway {
    fn completing(payment_id: &str) -> Self {
        Self {
            load_ok: true,
            outcome: Mutex::new(Some(ModalOutcome::Completed(PaymentResult {
                payment_id: PaymentId::new(payment_id),
                order_id: None,
                signature: None,
            }))),
        }
    }

    fn with_outcome(outcome: ModalOutcome) -> Self {
        Self {
            load_ok: true,
            outcome: Mutex::new(Some(outcome)),
        }
    }

    fn unreachable_runtime() -> Self {
        Self {
            load_ok: false,
            outcome: Mutex::new(None),
        }
    }
}

impl PaymentGateway for ScriptedGateway {
    async fn load(&self) -> bool {
        self.load_ok
    }

    async fn open_modal(&self, _options: ModalOptions) -> ModalOutcome {
        self.outcome
            .lock()
            .unwrap()
            .take()
            .expect("modal opened more than once")
    }
}

/// The flow plus an orchestrator, wired the way the site wires them.
struct Harness {
    flow: Arc<Mutex<PurchaseFlow>>,
    orchestrator: CheckoutOrchestrator<ScriptedGateway>,
}

impl Harness {
    fn new(gateway: ScriptedGateway) -> Self {
        Self {
            flow: Arc::new(Mutex::new(PurchaseFlow::new())),
            orchestrator: CheckoutOrchestrator::new(
                gateway,
                ekagra_site::checkout::CheckoutDefaults::default(),
            ),
        }
    }

    fn with_flow<T>(&self, f: impl FnOnce(&mut PurchaseFlow) -> T) -> T {
        f(&mut self.flow.lock().unwrap())
    }

    /// Select a format, fill the form, submit, and run the whole checkout
    /// attempt to completion.
    async fn purchase(&self, format: BookFormatId, shipping: ShippingInfo) {
        let submission = self.with_flow(|flow| {
            flow.select_format(format);
            flow.edit(shipping);
            flow.submit()
        });
        let Submission::Proceed(shipping) = submission else {
            panic!("expected validation to pass");
        };

        let book = BookFormat::find(format);
        let on_success = {
            let flow = Arc::clone(&self.flow);
            Box::new(move |result: PaymentResult| flow.lock().unwrap().complete(result))
        };
        let on_failure = {
            let flow = Arc::clone(&self.flow);
            Box::new(move |reason: FailureReason| flow.lock().unwrap().fail(&reason))
        };

        self.orchestrator
            .open_checkout(CheckoutRequest {
                amount_minor: book.price.amount_minor(),
                currency: Some(book.price.currency()),
                item_label: book.label.clone(),
                item_description: book.description.clone(),
                prefill: BuyerPrefill {
                    name: shipping.full_name.clone(),
                    email: shipping.email.clone(),
                    phone: shipping.phone.clone(),
                },
                notes: BTreeMap::new(),
                accent_color: None,
                on_success,
                on_failure,
            })
            .await;
    }
}

fn valid_shipping() -> ShippingInfo {
    ShippingInfo {
        full_name: "Priya Sharma".to_string(),
        email: "priya@example.com".to_string(),
        phone: "9876543210".to_string(),
        address_line1: "14 Lakeview Road".to_string(),
        address_line2: "Flat 3B".to_string(),
        city: "Pune".to_string(),
        state: "Maharashtra".to_string(),
        postal_code: "411001".to_string(),
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_successful_hardcover_purchase_end_to_end() {
    let harness = Harness::new(ScriptedGateway::completing("pay_test123"));

    harness
        .purchase(BookFormatId::Hardcover, valid_shipping())
        .await;

    harness.with_flow(|flow| {
        let outcome = flow.outcome().expect("purchase should have completed");
        assert_eq!(outcome.format, BookFormatId::Hardcover);
        assert_eq!(outcome.result.payment_id.as_str(), "pay_test123");
        assert_eq!(outcome.shipping.full_name, "Priya Sharma");
        assert_eq!(outcome.shipping.postal_code, "411001");

        assert!(matches!(flow.take_notice(), Some(Notice::Success(_))));
        assert_eq!(*flow.stage(), Stage::Idle);
    });

    // The flow accepts a fresh purchase afterwards.
    harness.with_flow(|flow| {
        flow.select_format(BookFormatId::Ebook);
        assert_eq!(*flow.stage(), Stage::ModalOpen(BookFormatId::Ebook));
        assert!(flow.outcome().is_none());
    });
}

#[tokio::test]
async fn test_hardcover_charges_two_thousand_rupees() {
    let hardcover = BookFormat::find(BookFormatId::Hardcover);
    assert_eq!(hardcover.price.amount_minor(), 200_000);
    assert_eq!(hardcover.price.display(), "₹2,000.00");
}

#[tokio::test]
async fn test_dismissed_modal_leaves_no_notice() {
    let harness = Harness::new(ScriptedGateway::with_outcome(ModalOutcome::Dismissed));

    harness
        .purchase(BookFormatId::Paperback, valid_shipping())
        .await;

    harness.with_flow(|flow| {
        assert_eq!(*flow.stage(), Stage::Idle);
        assert!(flow.outcome().is_none());
        assert!(flow.take_notice().is_none());
    });
}

#[tokio::test]
async fn test_provider_failure_surfaces_its_message() {
    let harness = Harness::new(ScriptedGateway::with_outcome(ModalOutcome::Failed(
        GatewayError::Provider("Card declined by issuing bank".to_string()),
    )));

    harness
        .purchase(BookFormatId::Ebook, valid_shipping())
        .await;

    harness.with_flow(|flow| {
        assert_eq!(*flow.stage(), Stage::Idle);
        assert_eq!(
            flow.take_notice(),
            Some(Notice::Error("Card declined by issuing bank".to_string()))
        );
    });
}

#[tokio::test]
async fn test_unreachable_checkout_runtime_fails_without_a_modal() {
    let harness = Harness::new(ScriptedGateway::unreachable_runtime());

    harness
        .purchase(BookFormatId::Hardcover, valid_shipping())
        .await;

    harness.with_flow(|flow| {
        assert_eq!(*flow.stage(), Stage::Idle);
        assert!(flow.outcome().is_none());
        assert!(matches!(flow.take_notice(), Some(Notice::Error(_))));
    });
}

#[tokio::test]
async fn test_invalid_form_never_reaches_the_gateway() {
    let harness = Harness::new(ScriptedGateway::completing("pay_never"));

    let submission = harness.with_flow(|flow| {
        flow.select_format(BookFormatId::Hardcover);
        let mut shipping = valid_shipping();
        shipping.email = "nope".to_string();
        flow.edit(shipping);
        flow.submit()
    });

    let Submission::Blocked(errors) = submission else {
        panic!("expected validation to block the submit");
    };
    assert!(errors.get("email").is_some());
    harness.with_flow(|flow| {
        assert_eq!(*flow.stage(), Stage::ModalOpen(BookFormatId::Hardcover));
    });
}
