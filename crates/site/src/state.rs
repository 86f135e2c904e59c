//! Application state shared across handlers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::checkout::{
    CheckoutDefaults, CheckoutOrchestrator, PendingPayments, PurchaseFlow, RazorpayGateway,
};
use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::prefs::Preferences;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the content store, the checkout orchestrator, and
/// configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    content: ContentStore,
    prefs: Preferences,
    checkout: CheckoutOrchestrator<RazorpayGateway>,
    pending: PendingPayments,
    flow: Mutex<PurchaseFlow>,
    // Bumped after every flow mutation so handlers racing an async outcome
    // can wait for the flow to move before rendering.
    flow_changed: watch::Sender<u64>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: SiteConfig, content: ContentStore, prefs: Preferences) -> Self {
        let pending = PendingPayments::new();
        let gateway = RazorpayGateway::new(
            reqwest::Client::new(),
            config.checkout.clone(),
            pending.clone(),
        );
        let defaults = CheckoutDefaults {
            currency: config.checkout.currency,
            accent_color: config.checkout.accent_color.clone(),
        };
        let checkout = CheckoutOrchestrator::new(gateway, defaults);
        let (flow_changed, _) = watch::channel(0);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                content,
                prefs,
                checkout,
                pending,
                flow: Mutex::new(PurchaseFlow::new()),
                flow_changed,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the markdown content store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Get the visitor preferences handle.
    #[must_use]
    pub fn prefs(&self) -> &Preferences {
        &self.inner.prefs
    }

    /// Get the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutOrchestrator<RazorpayGateway> {
        &self.inner.checkout
    }

    /// Get the pending payment registry.
    #[must_use]
    pub fn pending(&self) -> &PendingPayments {
        &self.inner.pending
    }

    /// Run a closure against the purchase flow and notify waiters.
    pub fn with_flow<T>(&self, f: impl FnOnce(&mut PurchaseFlow) -> T) -> T {
        let result = {
            let mut flow = self
                .inner
                .flow
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            f(&mut flow)
        };
        self.inner.flow_changed.send_modify(|version| *version += 1);
        result
    }

    /// Subscribe to the flow version counter.
    ///
    /// Subscribe before spawning work that mutates the flow, then wait for
    /// the version to move past the snapshot.
    #[must_use]
    pub fn subscribe_flow(&self) -> watch::Receiver<u64> {
        self.inner.flow_changed.subscribe()
    }

    /// Wait until the purchase flow changes, or the timeout elapses.
    ///
    /// Used by handlers that just triggered an async checkout outcome and
    /// want to render its effect rather than a stale page.
    pub async fn wait_for_flow_change(&self, timeout: Duration) {
        let mut rx = self.inner.flow_changed.subscribe();
        let seen = *rx.borrow_and_update();
        let _ = tokio::time::timeout(timeout, rx.wait_for(|version| *version > seen)).await;
    }
}
