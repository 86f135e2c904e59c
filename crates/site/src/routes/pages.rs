//! Static markdown page handlers (privacy, terms).

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use crate::content::Page;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Markdown page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub page: Page,
    pub nonce: String,
    pub base_url: String,
}

/// Display the privacy policy.
#[instrument(skip(state, nonce))]
pub async fn privacy(
    State(state): State<AppState>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse, StatusCode> {
    render_page(&state, "privacy", nonce)
}

/// Display the terms of service.
#[instrument(skip(state, nonce))]
pub async fn terms(
    State(state): State<AppState>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse, StatusCode> {
    render_page(&state, "terms", nonce)
}

fn render_page(
    state: &AppState,
    slug: &str,
    nonce: String,
) -> Result<ContentPageTemplate, StatusCode> {
    let page = state
        .content()
        .get_page(slug)
        .ok_or(StatusCode::NOT_FOUND)?
        .clone();
    Ok(ContentPageTemplate {
        page,
        nonce,
        base_url: state.config().base_url.clone(),
    })
}
