#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the dispatch map.
//!
//! Spawns the background feed poller at startup and serves the current
//! incident buffer as a `GeoJSON` `FeatureCollection` for browser maps and
//! desktop GIS clients. CORS is permissive by default so the endpoint can be
//! loaded directly from any origin.

mod handlers;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use dispatch_map_feed::poller::FeedPoller;
use dispatch_map_store::IncidentStore;
use tokio::sync::watch;

/// Default seconds between poll cycles.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default number of incidents retained in memory.
const DEFAULT_MAX_INCIDENTS: usize = 500;

/// Shared application state.
pub struct AppState {
    /// Incident buffer, written by the poller and read by handlers.
    pub store: Arc<IncidentStore>,
}

/// Starts the dispatch map server.
///
/// Reads configuration from the environment (`FEED_URL`,
/// `POLL_INTERVAL_SECS`, `MAX_INCIDENTS`, `BIND_ADDR`, `PORT`), spawns the
/// feed poller on the Actix runtime, and runs the HTTP server until it
/// exits. The poller is signalled to stop once the server has shut down.
/// This is a regular async function — the caller provides the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if `FEED_URL` is not set or the feed HTTP client cannot be built.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let feed_url = std::env::var("FEED_URL").expect("FEED_URL must be set");
    let poll_interval = std::env::var("POLL_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
    let max_incidents = std::env::var("MAX_INCIDENTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_INCIDENTS);

    let store = Arc::new(IncidentStore::new(max_incidents));

    let poller = FeedPoller::new(
        feed_url,
        Duration::from_secs(poll_interval),
        Arc::clone(&store),
    )
    .expect("Failed to build feed HTTP client");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    actix_web::rt::spawn(poller.run(shutdown_rx));

    let state = web::Data::new(AppState { store });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/geojson", web::get().to(handlers::geojson)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await;

    // Stop the poller between cycles now that the server has exited.
    let _ = shutdown_tx.send(true);

    result
}
