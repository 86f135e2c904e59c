//! Book purchase route handlers.
//!
//! The purchase is a three-page flow: the book page with format pickers,
//! the shipping form, and the hosted checkout page. The checkout attempt
//! itself runs as a spawned task driven by the orchestrator; the handlers
//! here hand the buyer over to the hosted modal and feed its callbacks
//! back into the attempt.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use ekagra_core::OrderId;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::checkout::{
    BookFormat, BookFormatId, BuyerPrefill, CallbackEvent, CheckoutRequest, CompletedPurchase,
    FailureReason, HostedCheckout, Notice, PaymentResult, ShippingInfo, Stage, Submission,
    ValidationErrorMap,
};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// How long the submit handler waits for the provider order before giving
/// up and sending the buyer back to the book page.
const HANDOFF_TIMEOUT: Duration = Duration::from_secs(10);

/// How long callback handlers wait for the spawned attempt to absorb the
/// outcome before rendering.
const OUTCOME_SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Book page template: format pickers plus any pending notice.
#[derive(Template, WebTemplate)]
#[template(path = "book/index.html")]
pub struct BookTemplate {
    pub formats: Vec<BookFormat>,
    pub notice: Option<Notice>,
    pub nonce: String,
    pub base_url: String,
}

/// Shipping form template.
#[derive(Template, WebTemplate)]
#[template(path = "book/shipping.html")]
pub struct ShippingTemplate {
    pub format: BookFormat,
    pub shipping: ShippingInfo,
    pub errors: ValidationErrorMap,
    pub nonce: String,
    pub base_url: String,
}

/// Hosted checkout page template. Its inline script opens the provider
/// modal with these options and posts the outcome to the callback routes.
#[derive(Template, WebTemplate)]
#[template(path = "book/checkout.html")]
pub struct CheckoutTemplate {
    pub hosted: HostedCheckout,
    pub nonce: String,
    pub base_url: String,
}

/// Confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "book/confirmation.html")]
pub struct ConfirmationTemplate {
    pub purchase: CompletedPurchase,
    pub format: BookFormat,
    pub notice: Option<Notice>,
    pub nonce: String,
    pub base_url: String,
}

/// Display the book page.
#[instrument(skip(state, nonce))]
pub async fn index(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    let notice = state.with_flow(crate::checkout::PurchaseFlow::take_notice);
    BookTemplate {
        formats: BookFormat::all(),
        notice,
        nonce,
        base_url: state.config().base_url.clone(),
    }
}

/// Display the shipping form for a format, starting a fresh attempt.
///
/// # Errors
///
/// Returns 404 for an unknown format slug.
#[instrument(skip(state, nonce))]
pub async fn order_form(
    State(state): State<AppState>,
    Path(format): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse, StatusCode> {
    let format = BookFormatId::from_str(&format).map_err(|_| StatusCode::NOT_FOUND)?;
    add_breadcrumb("purchase", "Opened shipping form", Some(&[("format", format.as_str())]));

    let (shipping, errors) = state.with_flow(|flow| {
        flow.select_format(format);
        (flow.shipping().clone(), flow.errors().clone())
    });

    Ok(ShippingTemplate {
        format: BookFormat::find(format),
        shipping,
        errors,
        nonce,
        base_url: state.config().base_url.clone(),
    })
}

/// Close the shipping form without submitting, discarding the in-progress
/// address, and return to the book page.
///
/// # Errors
///
/// Returns 404 for an unknown format slug.
#[instrument(skip(state))]
pub async fn order_cancel(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let format = BookFormatId::from_str(&format).map_err(|_| StatusCode::NOT_FOUND)?;
    add_breadcrumb("purchase", "Closed shipping form", Some(&[("format", format.as_str())]));

    state.with_flow(crate::checkout::PurchaseFlow::cancel);
    Ok(Redirect::to("/book"))
}

/// Validate the shipping form and, if clean, start a checkout attempt.
///
/// On success the response is the hosted checkout page for the provider
/// order the attempt just created. On validation failure the form is
/// re-rendered with errors. If the attempt dies before an order exists
/// (script unreachable, order creation rejected), the buyer lands back on
/// the book page where the failure notice shows.
///
/// # Errors
///
/// Returns 404 for an unknown format slug.
#[instrument(skip(state, nonce, form))]
pub async fn order_submit(
    State(state): State<AppState>,
    Path(format): Path<String>,
    CspNonce(nonce): CspNonce,
    Form(form): Form<ShippingInfo>,
) -> Result<Response, StatusCode> {
    let format = BookFormatId::from_str(&format).map_err(|_| StatusCode::NOT_FOUND)?;
    let book = BookFormat::find(format);

    let submission = state.with_flow(|flow| {
        // A direct POST without the GET first still gets a coherent flow.
        if *flow.stage() != Stage::ModalOpen(format) {
            flow.select_format(format);
        }
        flow.edit(form);
        flow.submit()
    });

    let shipping = match submission {
        Submission::Blocked(errors) => {
            let shipping = state.with_flow(|flow| flow.shipping().clone());
            return Ok(ShippingTemplate {
                format: book,
                shipping,
                errors,
                nonce,
                base_url: state.config().base_url.clone(),
            }
            .into_response());
        }
        Submission::Proceed(shipping) => shipping,
    };

    add_breadcrumb("purchase", "Starting checkout", Some(&[("format", format.as_str())]));

    // Subscribe to both channels before the attempt can touch either.
    let mut hosted_rx = state.pending().subscribe();
    let mut flow_rx = state.subscribe_flow();
    let seen = *flow_rx.borrow_and_update();

    let request = build_request(&state, &book, &shipping);
    {
        let state = state.clone();
        tokio::spawn(async move { state.checkout().open_checkout(request).await });
    }

    // Either the attempt parks a provider order for us to render, or it
    // fails first and moves the flow.
    let hosted = tokio::time::timeout(HANDOFF_TIMEOUT, async {
        tokio::select! {
            hosted = hosted_rx.wait_for(Option::is_some) => {
                hosted.ok().and_then(|guard| guard.clone())
            }
            _ = flow_rx.wait_for(move |version| *version > seen) => None,
        }
    })
    .await
    .ok()
    .flatten();

    match hosted {
        Some(hosted) => Ok(CheckoutTemplate {
            hosted,
            nonce,
            base_url: state.config().base_url.clone(),
        }
        .into_response()),
        None => Ok(Redirect::to("/book").into_response()),
    }
}

fn build_request(state: &AppState, book: &BookFormat, shipping: &ShippingInfo) -> CheckoutRequest {
    let mut notes = BTreeMap::new();
    notes.insert("format".to_string(), book.id.as_str().to_string());
    notes.insert("city".to_string(), shipping.city.trim().to_string());
    notes.insert(
        "postal_code".to_string(),
        shipping.postal_code.trim().to_string(),
    );

    let on_success = {
        let state = state.clone();
        Box::new(move |result: PaymentResult| state.with_flow(|flow| flow.complete(result)))
    };
    let on_failure = {
        let state = state.clone();
        Box::new(move |reason: FailureReason| state.with_flow(|flow| flow.fail(&reason)))
    };

    CheckoutRequest {
        amount_minor: book.price.amount_minor(),
        currency: Some(book.price.currency()),
        item_label: book.label.clone(),
        item_description: book.description.clone(),
        prefill: BuyerPrefill {
            name: shipping.full_name.trim().to_string(),
            email: shipping.email.trim().to_string(),
            phone: shipping.phone.trim().to_string(),
        },
        notes,
        accent_color: None,
        on_success,
        on_failure,
    }
}

/// Success callback posted by the hosted checkout page.
#[derive(Debug, Deserialize)]
pub struct PaymentCallbackForm {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

/// Record a completed payment and send the buyer to the confirmation page.
#[instrument(skip(state, form))]
pub async fn payment_callback(
    State(state): State<AppState>,
    Form(form): Form<PaymentCallbackForm>,
) -> impl IntoResponse {
    let order_id = OrderId::new(form.razorpay_order_id);
    let event = CallbackEvent::Completed {
        payment_id: ekagra_core::PaymentId::new(form.razorpay_payment_id),
        signature: form.razorpay_signature,
    };

    if state.pending().resolve(&order_id, event) {
        info!(order_id = %order_id, "payment completed");
        state.wait_for_flow_change(OUTCOME_SETTLE_TIMEOUT).await;
        Redirect::to("/book/confirmation")
    } else {
        warn!(order_id = %order_id, "success callback for unknown order");
        Redirect::to("/book")
    }
}

/// Failure callback posted by the hosted checkout page.
#[derive(Debug, Deserialize)]
pub struct PaymentFailedForm {
    pub razorpay_order_id: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Record a failed payment and send the buyer back to the book page.
#[instrument(skip(state, form))]
pub async fn payment_failed(
    State(state): State<AppState>,
    Form(form): Form<PaymentFailedForm>,
) -> impl IntoResponse {
    let order_id = OrderId::new(form.razorpay_order_id);
    let event = CallbackEvent::Failed {
        message: form.error_description.filter(|d| !d.trim().is_empty()),
    };

    if state.pending().resolve(&order_id, event) {
        state.wait_for_flow_change(OUTCOME_SETTLE_TIMEOUT).await;
    } else {
        warn!(order_id = %order_id, "failure callback for unknown order");
    }
    Redirect::to("/book")
}

/// Query for the dismissal route.
#[derive(Debug, Deserialize)]
pub struct CancelQuery {
    pub order_id: String,
}

/// Record a dismissed modal. Deliberately silent: closing the modal is a
/// normal exit, not an error.
#[instrument(skip(state))]
pub async fn payment_cancelled(
    State(state): State<AppState>,
    Query(query): Query<CancelQuery>,
) -> impl IntoResponse {
    let order_id = OrderId::new(query.order_id);
    if state.pending().resolve(&order_id, CallbackEvent::Dismissed) {
        state.wait_for_flow_change(OUTCOME_SETTLE_TIMEOUT).await;
    }
    Redirect::to("/book")
}

/// Display the confirmation page for the most recent completed purchase.
#[instrument(skip(state, nonce))]
pub async fn confirmation(
    State(state): State<AppState>,
    CspNonce(nonce): CspNonce,
) -> Result<Response, StatusCode> {
    let (purchase, notice) =
        state.with_flow(|flow| (flow.outcome().cloned(), flow.take_notice()));

    let Some(purchase) = purchase else {
        return Ok(Redirect::to("/book").into_response());
    };

    let format = BookFormat::find(purchase.format);
    Ok(ConfirmationTemplate {
        purchase,
        format,
        notice,
        nonce,
        base_url: state.config().base_url.clone(),
    }
    .into_response())
}
