//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//!
//! # Content
//! GET  /blog                    - Blog index
//! GET  /blog/{slug}             - Blog post
//! GET  /events                  - Upcoming and past events
//! GET  /events/{slug}           - Event detail
//! GET  /programs                - Coaching program listing
//! GET  /programs/{slug}         - Program detail
//! GET  /podcast                 - Podcast episodes and player
//! GET  /privacy                 - Privacy policy (markdown page)
//! GET  /terms                   - Terms of service (markdown page)
//!
//! # Contact
//! GET  /contact                 - Contact form
//! POST /contact                 - Contact form submission
//!
//! # Book purchase
//! GET  /book                    - Book page with format pickers
//! GET  /book/order/{format}     - Shipping form for a format
//! POST /book/order/{format}     - Validate shipping, start checkout
//! GET  /book/order/{format}/cancel - Discard the shipping form
//! POST /book/order/callback     - Hosted checkout success callback
//! POST /book/order/failed       - Hosted checkout failure callback
//! GET  /book/order/cancel       - Hosted checkout dismissed
//! GET  /book/confirmation       - Post-payment confirmation
//!
//! # Preferences API
//! GET  /api/preferences/mute    - Read the podcast mute flag
//! PUT  /api/preferences/mute    - Set the podcast mute flag
//! ```
//!
//! `/health` and the `/static` file service are wired up in the binary,
//! alongside the middleware stack.

pub mod blog;
pub mod book;
pub mod contact;
pub mod events;
pub mod home;
pub mod pages;
pub mod podcast;
pub mod preferences;
pub mod programs;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::filters;
use crate::state::AppState;

/// Create the blog routes router.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::index))
        .route("/{slug}", get(blog::show))
}

/// Create the event routes router.
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(events::index))
        .route("/{slug}", get(events::show))
}

/// Create the program routes router.
pub fn program_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(programs::index))
        .route("/{slug}", get(programs::show))
}

/// Create the book purchase routes router.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(book::index))
        .route(
            "/order/{format}",
            get(book::order_form).post(book::order_submit),
        )
        .route("/order/{format}/cancel", get(book::order_cancel))
        .route("/order/callback", post(book::payment_callback))
        .route("/order/failed", post(book::payment_failed))
        .route("/order/cancel", get(book::payment_cancelled))
        .route("/confirmation", get(book::confirmation))
}

/// Create the preferences API router.
pub fn preferences_routes() -> Router<AppState> {
    Router::new().route(
        "/mute",
        get(preferences::get_mute).put(preferences::set_mute),
    )
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/blog", blog_routes())
        .nest("/events", event_routes())
        .nest("/programs", program_routes())
        .route("/podcast", get(podcast::show))
        .route("/contact", get(contact::form).post(contact::submit))
        .route("/privacy", get(pages::privacy))
        .route("/terms", get(pages::terms))
        .nest("/book", book_routes())
        .nest("/api/preferences", preferences_routes())
        .fallback(not_found)
}

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub nonce: String,
    pub base_url: String,
}

/// Fallback handler for unmatched routes.
pub async fn not_found(
    axum::extract::State(state): axum::extract::State<AppState>,
    crate::middleware::CspNonce(nonce): crate::middleware::CspNonce,
) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            nonce,
            base_url: state.config().base_url.clone(),
        },
    )
}
