//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::content::{Event, Post};
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// The landing hero block.
#[derive(Clone)]
pub struct HeroConfig {
    pub eyebrow: String,
    pub title: String,
    pub subtitle: String,
    pub button_text: String,
    pub button_url: String,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            eyebrow: "Coaching for focused living".to_string(),
            title: "Do less. Finish more.".to_string(),
            subtitle: "One-on-one and group coaching for people who are done \
                       being busy and ready to be effective."
                .to_string(),
            button_text: "Explore the Programs".to_string(),
            button_url: "/programs".to_string(),
        }
    }
}

/// A client testimonial shown on the home page.
#[derive(Clone)]
pub struct Testimonial {
    pub quote: String,
    pub name: String,
    pub role: String,
}

/// The testimonial registry. Copy changes with a deploy, like the rest of
/// the static content.
#[must_use]
pub fn testimonials() -> Vec<Testimonial> {
    vec![
        Testimonial {
            quote: "Six months in, I shipped the project I had been circling \
                    for three years. The weekly cadence did it."
                .to_string(),
            name: "Rohan Iyer".to_string(),
            role: "Founder, Thornbird Studio".to_string(),
        },
        Testimonial {
            quote: "I came for productivity tricks and left with a calmer \
                    relationship to my own ambition."
                .to_string(),
            name: "Meera Krishnan".to_string(),
            role: "Product lead".to_string(),
        },
        Testimonial {
            quote: "The first coach who asked what I was willing to stop \
                    doing. Everything changed after that question."
                .to_string(),
            name: "Sanjay Patel".to_string(),
            role: "Consultant".to_string(),
        },
    ]
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub hero: HeroConfig,
    pub testimonials: Vec<Testimonial>,
    pub recent_posts: Vec<Post>,
    pub next_event: Option<Event>,
    pub nonce: String,
    pub base_url: String,
}

/// Number of recent posts featured on the home page.
const FEATURED_POSTS_COUNT: usize = 3;

/// Display the home page.
#[instrument(skip(state, nonce))]
pub async fn home(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    let recent_posts = state
        .content()
        .get_recent_posts(FEATURED_POSTS_COUNT, None)
        .into_iter()
        .cloned()
        .collect();
    let today = chrono::Utc::now().date_naive();
    let next_event = state
        .content()
        .upcoming_events(today)
        .first()
        .map(|event| (*event).clone());

    HomeTemplate {
        hero: HeroConfig::default(),
        testimonials: testimonials(),
        recent_posts,
        next_event,
        nonce,
        base_url: state.config().base_url.clone(),
    }
}
