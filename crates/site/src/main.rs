//! Ekagra site binary.
//!
//! Wires together the pieces the library exposes:
//!
//! - configuration from the environment
//! - Sentry and tracing, with spans forwarded as breadcrumbs
//! - markdown content loaded once at startup
//! - visitor preferences, file-backed when a path is configured
//! - the axum router with the middleware stack
//!
//! There is no database; every page renders from in-memory state.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::{Router, middleware::from_fn, routing::get};
use sentry::integrations::tracing as sentry_tracing;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, fmt};

use ekagra_site::config::SiteConfig;
use ekagra_site::content::ContentStore;
use ekagra_site::middleware::{
    csp_nonce_middleware, request_id_middleware, security_headers_middleware,
};
use ekagra_site::prefs::{JsonFileStore, Preferences};
use ekagra_site::routes;
use ekagra_site::state::AppState;

fn init_sentry(config: &SiteConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;
    Some(sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

/// Errors and warnings become Sentry events; info and debug become
/// breadcrumbs attached to the next event.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    use sentry_tracing::EventFilter;
    use tracing::Level;
    match *metadata.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let config = SiteConfig::from_env().expect("Failed to load configuration");
    let _sentry_guard = init_sentry(&config);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ekagra_site=info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let content = ContentStore::load(&config.content_dir).expect("Failed to load content");

    let prefs = match &config.prefs_path {
        Some(path) => {
            let store = JsonFileStore::open(path.clone()).expect("Failed to open preferences file");
            Preferences::new(Arc::new(store))
        }
        None => {
            tracing::info!("SITE_PREFS_PATH not set, preferences will not survive restarts");
            Preferences::in_memory()
        }
    };

    let addr = config.socket_addr();
    let state = AppState::new(config, content, prefs);

    // Request flow: sentry scope, trace span, request id, CSP nonce,
    // security headers (which read the nonce), then the handler.
    let app = Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/site/static"))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = TcpListener::bind(addr).await.expect("Failed to bind");
    tracing::info!("Listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn health() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Ctrl+C handler could not be installed");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler could not be installed")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = sigterm => {},
    }

    tracing::info!("Shutting down");
}
