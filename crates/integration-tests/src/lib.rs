//! Integration tests for the Ekagra site.
//!
//! The tests live under `tests/` and exercise the purchase pipeline through
//! the public library API: the purchase flow state machine, the checkout
//! orchestrator, and the pending-payment registry wired together against
//! scripted gateways. Nothing here talks to the network.
