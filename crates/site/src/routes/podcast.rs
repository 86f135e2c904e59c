//! Podcast page route handler.
//!
//! The episode list is an in-code registry. The page's audio player reads
//! its initial mute state from the preferences API and writes changes back
//! through it, so the choice survives page loads.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// One podcast episode.
#[derive(Clone)]
pub struct Episode {
    pub number: u32,
    pub title: &'static str,
    pub summary: &'static str,
    pub published: &'static str,
    pub audio_url: &'static str,
    pub duration: &'static str,
}

/// The episode registry, newest first.
#[must_use]
pub fn all_episodes() -> Vec<Episode> {
    vec![
        Episode {
            number: 12,
            title: "The Cost of Almost",
            summary: "Why ninety-percent-done projects are the most expensive \
                      thing you own.",
            published: "2025-07-10",
            audio_url: "/static/audio/ep12-the-cost-of-almost.mp3",
            duration: "34:12",
        },
        Episode {
            number: 11,
            title: "Saying No Slowly",
            summary: "A listener question episode on declining good \
                      opportunities without burning bridges.",
            published: "2025-06-12",
            audio_url: "/static/audio/ep11-saying-no-slowly.mp3",
            duration: "28:47",
        },
        Episode {
            number: 10,
            title: "Quarterly Resets, Explained",
            summary: "The full walkthrough of the one-day review we run four \
                      times a year.",
            published: "2025-05-08",
            audio_url: "/static/audio/ep10-quarterly-resets.mp3",
            duration: "41:05",
        },
    ]
}

/// Podcast page template.
#[derive(Template, WebTemplate)]
#[template(path = "podcast.html")]
pub struct PodcastTemplate {
    pub episodes: Vec<Episode>,
    /// Initial mute state for the player.
    pub muted: bool,
    pub nonce: String,
    pub base_url: String,
}

/// Display the podcast page.
#[instrument(skip(state, nonce))]
pub async fn show(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    PodcastTemplate {
        episodes: all_episodes(),
        muted: state.prefs().muted(),
        nonce,
        base_url: state.config().base_url.clone(),
    }
}
