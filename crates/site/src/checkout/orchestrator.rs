//! The checkout orchestrator.
//!
//! Sequences one purchase attempt: runtime load, option resolution, modal
//! open, outcome dispatch. The orchestrator is fire-and-forget from the
//! caller's perspective; the outcome is delivered solely through the
//! request's callbacks, and exactly one of them fires per attempt.

use std::sync::atomic::{AtomicBool, Ordering};

use ekagra_core::CurrencyCode;
use uuid::Uuid;

use super::gateway::{GatewayError, ModalOptions, ModalOutcome, PaymentGateway};
use super::{CheckoutRequest, FailureReason};

/// Defaults applied when a request leaves a field unset.
#[derive(Debug, Clone)]
pub struct CheckoutDefaults {
    pub currency: CurrencyCode,
    pub accent_color: String,
}

impl Default for CheckoutDefaults {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::default(),
            accent_color: crate::config::DEFAULT_ACCENT_COLOR.to_string(),
        }
    }
}

/// Orchestrates hosted-checkout attempts against an injected gateway.
///
/// One attempt at a time: a call that arrives while another is in flight is
/// a no-op. The guard is the only state shared across overlapping calls and
/// is owned entirely by the orchestrator.
pub struct CheckoutOrchestrator<G> {
    gateway: G,
    defaults: CheckoutDefaults,
    in_flight: AtomicBool,
}

impl<G: PaymentGateway> CheckoutOrchestrator<G> {
    pub const fn new(gateway: G, defaults: CheckoutDefaults) -> Self {
        Self {
            gateway,
            defaults,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one checkout attempt to completion.
    ///
    /// Never returns an error to the caller: every exit path other than a
    /// completed payment goes through `on_failure` exactly once. Reentrant
    /// calls while an attempt is in flight do nothing at all (neither
    /// callback fires for them).
    pub async fn open_checkout(&self, request: CheckoutRequest) {
        if self.in_flight.swap(true, Ordering::Acquire) {
            tracing::debug!(label = %request.item_label, "checkout already in flight, ignoring");
            return;
        }
        // Cleared on every path out of this function, panics included.
        let _guard = InFlightGuard(&self.in_flight);

        let CheckoutRequest {
            amount_minor,
            currency,
            item_label,
            item_description,
            prefill,
            notes,
            accent_color,
            on_success,
            on_failure,
        } = request;

        if !self.gateway.load().await {
            tracing::warn!("checkout runtime unavailable, aborting attempt");
            on_failure(FailureReason::GatewayUnavailable);
            return;
        }

        let options = ModalOptions {
            amount_minor,
            currency: currency.unwrap_or(self.defaults.currency),
            label: item_label,
            description: item_description,
            receipt: Uuid::new_v4().to_string(),
            prefill,
            notes,
            accent_color: accent_color.unwrap_or_else(|| self.defaults.accent_color.clone()),
        };

        if options.amount_minor <= 0 {
            on_failure(FailureReason::Rejected {
                message: Some(format!(
                    "invalid amount: {} minor units",
                    options.amount_minor
                )),
            });
            return;
        }

        tracing::info!(
            amount_minor = options.amount_minor,
            currency = %options.currency,
            label = %options.label,
            "opening hosted checkout"
        );

        match self.gateway.open_modal(options).await {
            ModalOutcome::Completed(result) => {
                tracing::info!(payment_id = %result.payment_id, "payment completed");
                on_success(result);
            }
            ModalOutcome::Dismissed => {
                tracing::info!("checkout dismissed by buyer");
                on_failure(FailureReason::Dismissed);
            }
            ModalOutcome::Failed(GatewayError::Provider(message)) => {
                tracing::warn!(%message, "provider reported payment failure");
                on_failure(FailureReason::Rejected {
                    message: Some(message),
                });
            }
            ModalOutcome::Failed(err) => {
                tracing::warn!(error = %err, "checkout attempt failed");
                on_failure(FailureReason::Rejected { message: None });
            }
        }
    }
}

/// Clears the in-flight flag when the attempt ends, whichever way it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use ekagra_core::PaymentId;
    use tokio::sync::Notify;

    use super::super::{BuyerPrefill, PaymentResult};
    use super::*;

    /// Gateway scripted per test: counts calls, optionally parks the modal
    /// until released.
    struct ScriptedGateway {
        load_ok: bool,
        loads: AtomicUsize,
        opens: AtomicUsize,
        outcome: Mutex<Option<ModalOutcome>>,
        hold_modal: Option<Arc<Notify>>,
    }

    impl ScriptedGateway {
        fn new(load_ok: bool, outcome: ModalOutcome) -> Self {
            Self {
                load_ok,
                loads: AtomicUsize::new(0),
                opens: AtomicUsize::new(0),
                outcome: Mutex::new(Some(outcome)),
                hold_modal: None,
            }
        }
    }

    impl PaymentGateway for ScriptedGateway {
        async fn load(&self) -> bool {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.load_ok
        }

        async fn open_modal(&self, _options: ModalOptions) -> ModalOutcome {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.hold_modal {
                gate.notified().await;
            }
            self.outcome
                .lock()
                .unwrap()
                .take()
                .unwrap_or(ModalOutcome::Dismissed)
        }
    }

    /// Shared recorder for which callback fired with what.
    #[derive(Default)]
    struct Recorded {
        successes: Vec<PaymentResult>,
        failures: Vec<FailureReason>,
    }

    fn request(recorded: &Arc<Mutex<Recorded>>) -> CheckoutRequest {
        let on_success = {
            let recorded = Arc::clone(recorded);
            Box::new(move |result| recorded.lock().unwrap().successes.push(result))
        };
        let on_failure = {
            let recorded = Arc::clone(recorded);
            Box::new(move |reason| recorded.lock().unwrap().failures.push(reason))
        };
        CheckoutRequest {
            amount_minor: 200_000,
            currency: None,
            item_label: "Hardcover Edition".to_string(),
            item_description: "Cloth-bound hardcover".to_string(),
            prefill: BuyerPrefill::default(),
            notes: BTreeMap::new(),
            accent_color: None,
            on_success,
            on_failure,
        }
    }

    fn defaults() -> CheckoutDefaults {
        CheckoutDefaults {
            currency: CurrencyCode::Inr,
            accent_color: "#c2410c".to_string(),
        }
    }

    #[tokio::test]
    async fn completed_payment_fires_on_success_only() {
        let result = PaymentResult {
            payment_id: PaymentId::new("pay_test123"),
            order_id: None,
            signature: None,
        };
        let orchestrator = CheckoutOrchestrator::new(
            ScriptedGateway::new(true, ModalOutcome::Completed(result.clone())),
            defaults(),
        );

        let recorded = Arc::new(Mutex::new(Recorded::default()));
        orchestrator.open_checkout(request(&recorded)).await;

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.successes, vec![result]);
        assert!(recorded.failures.is_empty());
    }

    #[tokio::test]
    async fn load_failure_fires_on_failure_once_and_skips_modal() {
        let gateway = ScriptedGateway::new(false, ModalOutcome::Dismissed);
        let orchestrator = CheckoutOrchestrator::new(gateway, defaults());

        let recorded = Arc::new(Mutex::new(Recorded::default()));
        orchestrator.open_checkout(request(&recorded)).await;

        // No modal-open side effect occurred.
        assert_eq!(orchestrator.gateway.opens.load(Ordering::SeqCst), 0);
        let recorded = recorded.lock().unwrap();
        assert!(recorded.successes.is_empty());
        assert_eq!(recorded.failures, vec![FailureReason::GatewayUnavailable]);
    }

    #[tokio::test]
    async fn dismissal_is_distinguishable_from_provider_failure() {
        let orchestrator =
            CheckoutOrchestrator::new(ScriptedGateway::new(true, ModalOutcome::Dismissed), defaults());

        let recorded = Arc::new(Mutex::new(Recorded::default()));
        orchestrator.open_checkout(request(&recorded)).await;

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.failures, vec![FailureReason::Dismissed]);
        assert!(recorded.failures[0].notice().is_none(), "dismissal is silent");
    }

    #[tokio::test]
    async fn provider_failure_carries_the_message() {
        let orchestrator = CheckoutOrchestrator::new(
            ScriptedGateway::new(
                true,
                ModalOutcome::Failed(GatewayError::Provider("card declined".to_string())),
            ),
            defaults(),
        );

        let recorded = Arc::new(Mutex::new(Recorded::default()));
        orchestrator.open_checkout(request(&recorded)).await;

        let recorded = recorded.lock().unwrap();
        assert_eq!(
            recorded.failures,
            vec![FailureReason::Rejected {
                message: Some("card declined".to_string())
            }]
        );
        assert_eq!(recorded.failures[0].notice().as_deref(), Some("card declined"));
    }

    #[tokio::test]
    async fn reentrant_call_is_a_no_op() {
        let gate = Arc::new(Notify::new());
        let mut gateway = ScriptedGateway::new(true, ModalOutcome::Dismissed);
        gateway.hold_modal = Some(Arc::clone(&gate));
        let orchestrator = Arc::new(CheckoutOrchestrator::new(gateway, defaults()));

        let recorded = Arc::new(Mutex::new(Recorded::default()));

        // First attempt parks inside the modal.
        let first = {
            let orchestrator = Arc::clone(&orchestrator);
            let request = request(&recorded);
            tokio::spawn(async move { orchestrator.open_checkout(request).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(orchestrator.gateway.opens.load(Ordering::SeqCst), 1);

        // Second attempt while the first is in flight: nothing happens.
        orchestrator.open_checkout(request(&recorded)).await;
        assert_eq!(orchestrator.gateway.loads.load(Ordering::SeqCst), 1);
        assert_eq!(orchestrator.gateway.opens.load(Ordering::SeqCst), 1);
        assert!(recorded.lock().unwrap().failures.is_empty());

        // Release the first attempt; its dismissal is the only outcome.
        gate.notify_one();
        first.await.unwrap();
        assert_eq!(recorded.lock().unwrap().failures.len(), 1);

        // The guard cleared, so a new attempt runs again. Pre-store a permit
        // so the held modal passes straight through this time.
        gate.notify_one();
        orchestrator.open_checkout(request(&recorded)).await;
        assert_eq!(orchestrator.gateway.opens.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected_without_a_modal() {
        let orchestrator =
            CheckoutOrchestrator::new(ScriptedGateway::new(true, ModalOutcome::Dismissed), defaults());

        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut bad = request(&recorded);
        bad.amount_minor = 0;
        orchestrator.open_checkout(bad).await;

        assert_eq!(orchestrator.gateway.opens.load(Ordering::SeqCst), 0);
        let recorded = recorded.lock().unwrap();
        assert!(matches!(
            recorded.failures.as_slice(),
            [FailureReason::Rejected { message: Some(_) }]
        ));
    }
}
