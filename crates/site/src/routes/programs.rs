//! Coaching program route handlers.
//!
//! The program catalog is an in-code registry; it changes a few times a
//! year, together with the copy around it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// One coaching program.
#[derive(Clone)]
pub struct Program {
    pub slug: &'static str,
    pub name: &'static str,
    pub tagline: &'static str,
    pub duration: &'static str,
    pub format: &'static str,
    /// Paragraphs for the detail page.
    pub body: &'static [&'static str],
}

/// The program registry, in display order.
#[must_use]
pub fn all_programs() -> Vec<Program> {
    vec![
        Program {
            slug: "one-on-one",
            name: "One-on-One Coaching",
            tagline: "Six months of weekly sessions built around one goal you actually care about.",
            duration: "6 months",
            format: "Weekly 50-minute video calls",
            body: &[
                "We start by naming the one outcome that matters this season and the \
                 commitments crowding it out. Every week after that is working the gap \
                 between what you said and what you did.",
                "Between sessions you get asynchronous check-ins and a shared working \
                 document that keeps decisions from evaporating.",
            ],
        },
        Program {
            slug: "focus-cohort",
            name: "The Focus Cohort",
            tagline: "A twelve-week small group for finishing one meaningful project.",
            duration: "12 weeks",
            format: "Groups of eight, two calls a week",
            body: &[
                "Eight people, one project each, twelve weeks. The cohort holds the \
                 deadline so you can hold the work.",
                "Mondays are planning calls; Fridays are demos. Showing unfinished work \
                 to the same seven people every week does more than any productivity \
                 system.",
            ],
        },
        Program {
            slug: "quarterly-reset",
            name: "Quarterly Reset",
            tagline: "A one-day guided review to close a quarter and choose the next one.",
            duration: "1 day",
            format: "In-person workshop, Pune",
            body: &[
                "A structured day of looking backward honestly and forward narrowly: \
                 what happened, what it cost, and the shortest list that deserves the \
                 next ninety days.",
            ],
        },
    ]
}

/// Program listing template.
#[derive(Template, WebTemplate)]
#[template(path = "programs/index.html")]
pub struct ProgramsIndexTemplate {
    pub programs: Vec<Program>,
    pub nonce: String,
    pub base_url: String,
}

/// Program detail template.
#[derive(Template, WebTemplate)]
#[template(path = "programs/show.html")]
pub struct ProgramShowTemplate {
    pub program: Program,
    pub nonce: String,
    pub base_url: String,
}

/// Display the program listing.
#[instrument(skip(state, nonce))]
pub async fn index(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    ProgramsIndexTemplate {
        programs: all_programs(),
        nonce,
        base_url: state.config().base_url.clone(),
    }
}

/// Display a single program by slug.
///
/// # Errors
///
/// Returns 404 if the program doesn't exist.
#[instrument(skip(state, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse, StatusCode> {
    let program = all_programs()
        .into_iter()
        .find(|program| program.slug == slug)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(ProgramShowTemplate {
        program,
        nonce,
        base_url: state.config().base_url.clone(),
    })
}
