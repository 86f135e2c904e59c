//! Event route handlers: workshops, retreats, and live sessions.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::content::Event;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Events listing template, split into upcoming and past.
#[derive(Template, WebTemplate)]
#[template(path = "events/index.html")]
pub struct EventsIndexTemplate {
    pub upcoming: Vec<Event>,
    pub past: Vec<Event>,
    pub nonce: String,
    pub base_url: String,
}

/// Event detail template.
#[derive(Template, WebTemplate)]
#[template(path = "events/show.html")]
pub struct EventShowTemplate {
    pub event: Event,
    pub is_upcoming: bool,
    pub nonce: String,
    pub base_url: String,
}

/// Display the events listing.
#[instrument(skip(state, nonce))]
pub async fn index(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    let today = chrono::Utc::now().date_naive();
    let upcoming = state
        .content()
        .upcoming_events(today)
        .into_iter()
        .cloned()
        .collect();
    let past = state
        .content()
        .past_events(today)
        .into_iter()
        .cloned()
        .collect();

    EventsIndexTemplate {
        upcoming,
        past,
        nonce,
        base_url: state.config().base_url.clone(),
    }
}

/// Display a single event by slug.
///
/// # Errors
///
/// Returns 404 if the event doesn't exist.
#[instrument(skip(state, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse, StatusCode> {
    let event = state
        .content()
        .get_event(&slug)
        .ok_or(StatusCode::NOT_FOUND)?
        .clone();
    let today = chrono::Utc::now().date_naive();
    let is_upcoming = event.meta.starts_at >= today;

    Ok(EventShowTemplate {
        event,
        is_upcoming,
        nonce,
        base_url: state.config().base_url.clone(),
    })
}
