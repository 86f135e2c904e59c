//! Registry bridging in-flight checkout attempts to the HTTP handlers that
//! learn their outcome.
//!
//! `RazorpayGateway::open_modal` parks each attempt here after creating the
//! provider order, then awaits the resolution. The hosted checkout page posts
//! back to the callback routes, which look the attempt up by order id and
//! resolve it. A `watch` channel carries the newest parked attempt so the
//! submit handler can render the checkout page as soon as it exists.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ekagra_core::{CurrencyCode, OrderId, PaymentId, Price};
use tokio::sync::{oneshot, watch};

use super::BuyerPrefill;

/// What the hosted checkout page reported back for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackEvent {
    /// The provider confirmed the payment.
    Completed {
        payment_id: PaymentId,
        signature: Option<String>,
    },
    /// The provider rejected the payment.
    Failed { message: Option<String> },
    /// The buyer closed the modal without paying.
    Dismissed,
}

/// Everything the checkout template needs to open the provider modal for a
/// parked attempt.
#[derive(Debug, Clone)]
pub struct HostedCheckout {
    pub order_id: OrderId,
    pub key_id: String,
    pub amount_minor: i64,
    pub currency: CurrencyCode,
    pub name: String,
    pub description: String,
    pub prefill: BuyerPrefill,
    pub accent_color: String,
}

impl HostedCheckout {
    /// Formatted amount for the checkout page, e.g. `₹2,000.00`.
    #[must_use]
    pub fn amount_display(&self) -> String {
        Price::from_minor(self.amount_minor, self.currency)
            .map_or_else(|_| String::new(), |price| price.display())
    }
}

struct PendingAttempt {
    hosted: HostedCheckout,
    resolve: oneshot::Sender<CallbackEvent>,
}

/// Shared registry of attempts awaiting a callback. Cheap to clone.
#[derive(Clone)]
pub struct PendingPayments {
    attempts: Arc<Mutex<HashMap<OrderId, PendingAttempt>>>,
    latest: Arc<watch::Sender<Option<HostedCheckout>>>,
}

impl Default for PendingPayments {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingPayments {
    #[must_use]
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            attempts: Arc::new(Mutex::new(HashMap::new())),
            latest: Arc::new(latest),
        }
    }

    /// Watch for the next parked attempt. Subscribe before spawning the
    /// checkout task to avoid missing it.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<HostedCheckout>> {
        self.latest.subscribe()
    }

    /// Park an attempt and hand back the receiver its outcome will arrive on.
    /// A second attempt under the same order id replaces the first; the
    /// replaced receiver observes a closed channel.
    pub fn park(&self, hosted: HostedCheckout) -> oneshot::Receiver<CallbackEvent> {
        let (tx, rx) = oneshot::channel();
        let order_id = hosted.order_id.clone();
        let attempt = PendingAttempt {
            hosted: hosted.clone(),
            resolve: tx,
        };
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.insert(order_id, attempt);
        }
        self.latest.send_replace(Some(hosted));
        rx
    }

    /// The hosted-checkout details for a parked attempt, if still pending.
    #[must_use]
    pub fn hosted(&self, order_id: &OrderId) -> Option<HostedCheckout> {
        self.attempts
            .lock()
            .ok()
            .and_then(|attempts| attempts.get(order_id).map(|a| a.hosted.clone()))
    }

    /// Resolve a parked attempt. Returns false when the order id is unknown,
    /// which covers replays and stale callbacks.
    pub fn resolve(&self, order_id: &OrderId, event: CallbackEvent) -> bool {
        let Some(attempt) = self
            .attempts
            .lock()
            .ok()
            .and_then(|mut attempts| attempts.remove(order_id))
        else {
            return false;
        };
        self.latest.send_replace(None);
        attempt.resolve.send(event).is_ok()
    }

    /// Drop a parked attempt that will never receive a callback, clearing
    /// the latest-attempt watch when it still points at this order.
    /// Returns false for an unknown order id.
    pub fn abandon(&self, order_id: &OrderId) -> bool {
        let removed = self
            .attempts
            .lock()
            .ok()
            .and_then(|mut attempts| attempts.remove(order_id))
            .is_some();
        if removed {
            self.latest.send_if_modified(|latest| {
                let stale = latest
                    .as_ref()
                    .is_some_and(|hosted| &hosted.order_id == order_id);
                if stale {
                    *latest = None;
                }
                stale
            });
        }
        removed
    }
}
