//! Markdown content loading.
//!
//! Pages, blog posts, and events live as markdown files with YAML
//! frontmatter under the content directory. Everything is parsed once at
//! startup and served from memory; publishing means deploying.
//!
//! Layout under the content root:
//!
//! - `pages/` - standalone pages, keyed by file stem
//! - `blog/` - posts, optionally date-prefixed (`2025-06-02-slug.md`)
//! - `events/` - workshops and retreats

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::Matter;
use gray_matter::engine::YAML;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Frontmatter for a standalone page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// Frontmatter for a blog post.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
}

/// Frontmatter for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub starts_at: NaiveDate,
    pub location: String,
    #[serde(default)]
    pub registration_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub meta: PostMeta,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub slug: String,
    pub meta: EventMeta,
    pub content_html: String,
}

/// In-memory content loaded at startup. Cloning is cheap; the collections
/// are shared behind `Arc`.
#[derive(Debug, Clone)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
    posts: Arc<Vec<Post>>,
    events: Arc<Vec<Event>>,
}

impl ContentStore {
    /// Load all content under `content_dir`.
    ///
    /// A missing subdirectory yields an empty collection. A file that
    /// fails to parse is logged and skipped so one bad post cannot take
    /// the site down.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Io`] when a present directory cannot be
    /// read at all.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let pages = load_dir(&content_dir.join("pages"), |slug, meta, content_html| Page {
            slug,
            meta,
            content_html,
        })?;
        let pages: HashMap<String, Page> = pages
            .into_iter()
            .map(|page| (page.slug.clone(), page))
            .collect();

        let mut posts = load_dir(&content_dir.join("blog"), |slug, meta, content_html| {
            let reading_time_minutes = estimate_reading_time(&content_html);
            Post {
                slug: strip_date_prefix(&slug).to_string(),
                meta,
                content_html,
                reading_time_minutes,
            }
        })?;
        posts.sort_by(|a, b| b.meta.published_at.cmp(&a.meta.published_at));

        let mut events = load_dir(&content_dir.join("events"), |slug, meta, content_html| Event {
            slug,
            meta,
            content_html,
        })?;
        events.sort_by(|a, b| a.meta.starts_at.cmp(&b.meta.starts_at));

        tracing::info!(
            pages = pages.len(),
            posts = posts.len(),
            events = events.len(),
            "content loaded"
        );

        Ok(Self {
            pages: Arc::new(pages),
            posts: Arc::new(posts),
            events: Arc::new(events),
        })
    }

    /// A store with nothing in it, for tests and bootstrapping.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            pages: Arc::new(HashMap::new()),
            posts: Arc::new(Vec::new()),
            events: Arc::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    #[must_use]
    pub fn get_post(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.slug == slug)
    }

    /// Published posts, newest first.
    pub fn get_published_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|post| !post.meta.draft)
    }

    /// Up to `limit` recent published posts, newest first, optionally
    /// excluding one slug (the post currently being read).
    #[must_use]
    pub fn get_recent_posts(&self, limit: usize, exclude_slug: Option<&str>) -> Vec<&Post> {
        self.get_published_posts()
            .filter(|post| exclude_slug != Some(post.slug.as_str()))
            .take(limit)
            .collect()
    }

    #[must_use]
    pub fn get_event(&self, slug: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.slug == slug)
    }

    /// Events on or after `today`, soonest first.
    #[must_use]
    pub fn upcoming_events(&self, today: NaiveDate) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|event| event.meta.starts_at >= today)
            .collect()
    }

    /// Events before `today`, most recent first.
    #[must_use]
    pub fn past_events(&self, today: NaiveDate) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|event| event.meta.starts_at < today)
            .rev()
            .collect()
    }
}

/// Load every `.md` file in `dir`, building entries with `build`.
/// Unparseable files are logged and skipped.
fn load_dir<M, T>(
    dir: &Path,
    build: impl Fn(String, M, String) -> T,
) -> Result<Vec<T>, ContentError>
where
    M: DeserializeOwned,
{
    if !dir.is_dir() {
        tracing::info!(dir = %dir.display(), "content directory absent, loading nothing");
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| ContentError::Io(e.to_string()))?;
    let mut out = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ContentError::Io(e.to_string()))?.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        match read_entry::<M>(&path) {
            Ok((slug, meta, html)) => out.push(build(slug, meta, html)),
            Err(error) => {
                tracing::error!(file = %path.display(), %error, "skipping content file");
            }
        }
    }
    Ok(out)
}

/// Parse one markdown file into (slug, frontmatter, rendered body).
fn read_entry<M: DeserializeOwned>(path: &Path) -> Result<(String, M, String), ContentError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ContentError::Io(format!("{}: {e}", path.display())))?;
    let parsed = Matter::<YAML>::new()
        .parse::<M>(&raw)
        .map_err(|e| ContentError::Parse(format!("{}: {e}", path.display())))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse(format!("{}: missing frontmatter", path.display())))?;
    Ok((slug_from_path(path), meta, render_markdown(&parsed.content)))
}

fn slug_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Drop a leading `YYYY-MM-DD-` from a post file stem, if present.
fn strip_date_prefix(slug: &str) -> &str {
    if slug.len() > 11 && slug.chars().nth(4) == Some('-') {
        if let Some(rest) = slug.get(11..) {
            return rest;
        }
    }
    slug
}

fn render_markdown(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;
    // Content is authored in-house, not user-submitted.
    options.render.r#unsafe = true;
    markdown_to_html(markdown, &options)
}

/// Reading time at 200 words per minute, never below one minute.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn estimate_reading_time(html: &str) -> u32 {
    let words = html.split_whitespace().count();
    ((words as f64 / 200.0).ceil() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_prefix_is_stripped() {
        assert_eq!(
            strip_date_prefix("2025-06-02-small-daily-promises"),
            "small-daily-promises"
        );
    }

    #[test]
    fn undated_slug_passes_through() {
        assert_eq!(strip_date_prefix("undated-post"), "undated-post");
        assert_eq!(strip_date_prefix("a-b"), "a-b");
    }

    #[test]
    fn markdown_rendering_supports_gfm() {
        let html = render_markdown("~~struck~~ and https://ekagra.in");
        assert!(html.contains("<del>struck</del>"));
        assert!(html.contains("href=\"https://ekagra.in\""));
    }

    #[test]
    fn reading_time_has_a_floor() {
        assert_eq!(estimate_reading_time("just a few words"), 1);
    }

    #[test]
    fn empty_store_finds_nothing() {
        let store = ContentStore::empty();
        assert!(store.get_page("about").is_none());
        assert!(store.get_post("anything").is_none());
        assert!(store.get_event("retreat").is_none());
        assert_eq!(store.get_published_posts().count(), 0);
    }
}
