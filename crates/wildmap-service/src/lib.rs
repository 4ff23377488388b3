//! wildmap HTTP service.
//!
//! Thin axum handlers over the `wildmap-lib` upstream clients:
//!
//! - `GET  /api/v1/autocomplete/locations` - enriched place autocomplete
//! - `GET  /api/v1/autocomplete/species` - taxon autocomplete
//! - `GET  /api/v1/observations/by-location` - observations within a place
//! - `GET  /api/v1/observations/by-species` - observations of a taxon
//! - `POST /api/v1/summary/place` - AI nature summary for a place
//! - `POST /api/v1/summary/species` - AI biology summary for a species
//! - `GET  /metrics`, `GET /health/live`, `GET /health/ready`
//!
//! All business logic lives in `wildmap-lib`; handlers parse input, call a
//! client, and map failures to `{error, details?}` responses.

#![deny(warnings)]

pub mod error;
pub mod extract;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::{AppConfig, AppState};

/// Build the service router with all routes and layers attached.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/autocomplete/locations",
            get(routes::autocomplete::locations),
        )
        .route(
            "/api/v1/autocomplete/species",
            get(routes::autocomplete::species),
        )
        .route(
            "/api/v1/observations/by-location",
            get(routes::observations::by_location),
        )
        .route(
            "/api/v1/observations/by-species",
            get(routes::observations::by_species),
        )
        .route("/api/v1/summary/place", post(routes::summary::place))
        .route("/api/v1/summary/species", post(routes::summary::species))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
