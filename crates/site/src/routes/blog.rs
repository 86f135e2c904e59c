//! Blog route handlers.
//!
//! Posts come straight out of the in-memory content store; drafts stay
//! invisible on both the index and the detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::content::Post;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// How many other posts the detail page links to.
const MORE_POSTS_COUNT: usize = 3;

/// Listing of every published post.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub posts: Vec<Post>,
    pub nonce: String,
    pub base_url: String,
}

/// A single post with a short list of related reading.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub post: Post,
    pub more_posts: Vec<Post>,
    pub nonce: String,
    pub base_url: String,
}

/// Display the blog index, newest post first.
#[instrument(skip(state, nonce))]
pub async fn index(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    let posts = state.content().get_published_posts().cloned().collect();
    BlogIndexTemplate {
        posts,
        nonce,
        base_url: state.config().base_url.clone(),
    }
}

/// Display a single published post.
///
/// # Errors
///
/// Returns 404 when the slug is unknown or the post is still a draft.
#[instrument(skip(state, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse, StatusCode> {
    let post = state
        .content()
        .get_post(&slug)
        .filter(|post| !post.meta.draft)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;

    let more_posts = state
        .content()
        .get_recent_posts(MORE_POSTS_COUNT, Some(&slug))
        .into_iter()
        .cloned()
        .collect();

    Ok(BlogShowTemplate {
        post,
        more_posts,
        nonce,
        base_url: state.config().base_url.clone(),
    })
}
