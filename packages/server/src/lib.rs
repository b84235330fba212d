#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the Mangrove Watch application.
//!
//! Serves the citizen submission flow, the authority review flow, the
//! projections (leaderboard, my-reports, stats), CSV export, a proxied
//! Nominatim geocode lookup, the demo login gate, and a per-context SSE
//! stream of store change events at `/api/events`. The report store is
//! file-backed under the configured data directory and degrades to
//! memory-only if that directory is unusable.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use mangrove_watch_auth::AuthGate;
use mangrove_watch_events::ChangeBus;
use mangrove_watch_geocoder::GeocoderConfig;
use mangrove_watch_store::{FileBackend, ReportStore};

/// Shared application state.
pub struct AppState {
    /// The canonical report store.
    pub store: Arc<ReportStore>,
    /// Change notification bus; SSE subscriptions hang off this.
    pub bus: ChangeBus,
    /// Geocoding service configuration.
    pub geocoder: GeocoderConfig,
    /// HTTP client for geocoding lookups, with the lookup timeout baked
    /// in.
    pub http: reqwest::Client,
    /// Authority credential gate.
    pub auth: AuthGate,
}

/// Starts the Mangrove Watch API server.
///
/// Opens the file-backed report store under `MANGROVE_DATA_DIR`
/// (default `data/`), builds the change bus and geocoding client, and
/// starts the Actix-Web HTTP server on `BIND_ADDR`/`PORT`. This is a
/// regular async function — the caller provides the async runtime (e.g.
/// via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the geocoding HTTP client cannot be constructed (TLS
/// backend initialization failure).
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let data_dir =
        std::env::var("MANGROVE_DATA_DIR").unwrap_or_else(|_| "data".to_string());

    let bus = ChangeBus::default();
    let store = Arc::new(ReportStore::open(
        Arc::new(FileBackend::in_dir(&data_dir)),
        bus.clone(),
    ));
    log::info!("report store opened with {} reports", store.len());

    let geocoder = GeocoderConfig::from_env();
    let http = geocoder
        .build_client()
        .expect("Failed to build geocoding HTTP client");

    let state = web::Data::new(AppState {
        store,
        bus,
        geocoder,
        http,
        auth: AuthGate::from_env(),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/reports", web::get().to(handlers::list_reports))
                    .route("/reports", web::post().to(handlers::submit_report))
                    .route("/reports/mine", web::get().to(handlers::my_reports))
                    .route(
                        "/reports/{id}/status",
                        web::post().to(handlers::set_status),
                    )
                    .route("/leaderboard", web::get().to(handlers::leaderboard))
                    .route("/stats", web::get().to(handlers::stats))
                    .route("/export", web::get().to(handlers::export_csv))
                    .route("/geocode", web::get().to(handlers::geocode))
                    .route("/login", web::post().to(handlers::login))
                    .route("/events", web::get().to(handlers::events)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
