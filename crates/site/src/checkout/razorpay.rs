//! Production [`PaymentGateway`] backed by Razorpay's hosted checkout.
//!
//! `load` probes the hosted checkout script with a single-flight HEAD
//! request; only a successful probe is cached, so a transient outage is
//! retried on the next attempt. `open_modal` creates an order via the
//! Orders API, parks the attempt in [`PendingPayments`], and waits for the
//! callback routes to report how the hosted page ended.

use std::collections::BTreeMap;
use std::time::Duration;

use ekagra_core::OrderId;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell, oneshot};
use tracing::{debug, warn};

use super::gateway::{GatewayError, ModalOptions, ModalOutcome, PaymentGateway};
use super::pending::{CallbackEvent, HostedCheckout, PendingPayments};
use super::PaymentResult;
use crate::config::CheckoutConfig;

/// The hosted checkout runtime. `load` succeeds iff this is reachable.
pub const CHECKOUT_SCRIPT_URL: &str = "https://checkout.razorpay.com/v1/checkout.js";

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a parked attempt may wait for its callback. A buyer who closes
/// the whole tab never fires `ondismiss`, so without a deadline the attempt
/// would hold the purchase flow in `Submitting` until restart.
const CALLBACK_DEADLINE: Duration = Duration::from_secs(15 * 60);

/// Gateway against the live Razorpay API.
pub struct RazorpayGateway {
    http: reqwest::Client,
    config: CheckoutConfig,
    brand: String,
    pending: PendingPayments,
    loaded: OnceCell<()>,
    load_lock: Mutex<()>,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    notes: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    description: String,
}

impl RazorpayGateway {
    #[must_use]
    pub fn new(http: reqwest::Client, config: CheckoutConfig, pending: PendingPayments) -> Self {
        Self {
            http,
            config,
            brand: crate::config::BRAND_NAME.to_string(),
            pending,
            loaded: OnceCell::new(),
            load_lock: Mutex::new(()),
        }
    }

    /// HEAD the checkout script once; concurrent callers share the probe.
    async fn probe_script(&self) -> bool {
        if self.loaded.get().is_some() {
            return true;
        }
        let _guard = self.load_lock.lock().await;
        if self.loaded.get().is_some() {
            return true;
        }

        let probe = self
            .http
            .head(CHECKOUT_SCRIPT_URL)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;
        match probe {
            Ok(response) if response.status().is_success() => {
                // Cache success only; a failed probe stays retryable.
                let _ = self.loaded.set(());
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "checkout script probe returned an error status");
                false
            }
            Err(err) => {
                warn!(error = %err, "checkout script probe failed");
                false
            }
        }
    }

    async fn create_order(&self, options: &ModalOptions) -> Result<String, GatewayError> {
        let body = CreateOrderRequest {
            amount: options.amount_minor,
            currency: options.currency.code(),
            receipt: &options.receipt,
            notes: &options.notes,
        };

        let response = self
            .http
            .post(ORDERS_URL)
            .basic_auth(&self.config.key_id, Some(self.config.exposed_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        if response.status().is_success() {
            let order: CreateOrderResponse = response
                .json()
                .await
                .map_err(|err| GatewayError::Transport(err.to_string()))?;
            debug!(order_id = %order.id, "created provider order");
            return Ok(order.id);
        }

        let status = response.status();
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error.description,
            Err(_) => format!("order creation failed with status {status}"),
        };
        Err(GatewayError::Provider(message))
    }
}

impl PaymentGateway for RazorpayGateway {
    async fn load(&self) -> bool {
        self.probe_script().await
    }

    async fn open_modal(&self, options: ModalOptions) -> ModalOutcome {
        let order_id = match self.create_order(&options).await {
            Ok(id) => OrderId::new(id),
            Err(err) => return ModalOutcome::Failed(err),
        };

        let hosted = HostedCheckout {
            order_id: order_id.clone(),
            key_id: self.config.key_id.clone(),
            amount_minor: options.amount_minor,
            currency: options.currency,
            name: self.brand.clone(),
            description: options.label,
            prefill: options.prefill,
            accent_color: options.accent_color,
        };
        let outcome = self.pending.park(hosted);
        await_callback(&self.pending, order_id, outcome, CALLBACK_DEADLINE).await
    }
}

/// Wait for the callback routes to resolve a parked attempt, up to
/// `deadline`. An attempt nobody reports back on is evicted and treated as
/// dismissed so the purchase flow returns to idle.
async fn await_callback(
    pending: &PendingPayments,
    order_id: OrderId,
    outcome: oneshot::Receiver<CallbackEvent>,
    deadline: Duration,
) -> ModalOutcome {
    match tokio::time::timeout(deadline, outcome).await {
        Ok(Ok(CallbackEvent::Completed {
            payment_id,
            signature,
        })) => ModalOutcome::Completed(PaymentResult {
            payment_id,
            order_id: Some(order_id),
            signature,
        }),
        Ok(Ok(CallbackEvent::Failed { message })) => {
            ModalOutcome::Failed(GatewayError::Provider(message.unwrap_or_else(|| {
                "The payment provider reported a failure.".to_string()
            })))
        }
        Ok(Ok(CallbackEvent::Dismissed)) => ModalOutcome::Dismissed,
        // Sender dropped without resolving: the attempt was superseded.
        Ok(Err(_)) => ModalOutcome::Failed(GatewayError::Transport(
            "checkout attempt abandoned".to_string(),
        )),
        Err(_) => {
            pending.abandon(&order_id);
            warn!(order_id = %order_id, "no callback before the deadline, treating the attempt as dismissed");
            ModalOutcome::Dismissed
        }
    }
}

#[cfg(test)]
mod tests {
    use ekagra_core::{CurrencyCode, PaymentId};

    use super::*;
    use crate::checkout::BuyerPrefill;

    fn parked(pending: &PendingPayments, order: &str) -> oneshot::Receiver<CallbackEvent> {
        pending.park(HostedCheckout {
            order_id: OrderId::new(order),
            key_id: "rzp_test_abc".to_string(),
            amount_minor: 200_000,
            currency: CurrencyCode::Inr,
            name: "Ekagra".to_string(),
            description: "Hardcover Edition".to_string(),
            prefill: BuyerPrefill::default(),
            accent_color: "#c2410c".to_string(),
        })
    }

    #[tokio::test]
    async fn test_missing_callback_times_out_as_dismissed() {
        let pending = PendingPayments::new();
        let order_id = OrderId::new("order_stale");
        let rx = parked(&pending, "order_stale");

        let outcome =
            await_callback(&pending, order_id.clone(), rx, Duration::from_millis(20)).await;

        assert!(matches!(outcome, ModalOutcome::Dismissed));
        // The attempt is gone; a late callback is a stale-order no-op.
        assert!(pending.hosted(&order_id).is_none());
        assert!(!pending.resolve(&order_id, CallbackEvent::Dismissed));
    }

    #[tokio::test]
    async fn test_callback_within_the_deadline_completes() {
        let pending = PendingPayments::new();
        let order_id = OrderId::new("order_live");
        let rx = parked(&pending, "order_live");

        assert!(pending.resolve(
            &order_id,
            CallbackEvent::Completed {
                payment_id: PaymentId::new("pay_test123"),
                signature: None,
            },
        ));

        match await_callback(&pending, order_id, rx, Duration::from_secs(5)).await {
            ModalOutcome::Completed(result) => {
                assert_eq!(result.payment_id.as_str(), "pay_test123");
            }
            other => panic!("expected a completed outcome, got {other:?}"),
        }
    }
}
