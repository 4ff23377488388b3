//! wildmap HTTP service binary.
//!
//! # Configuration
//!
//! - `GOOGLE_MAPS_API_KEY` - mapping service credential (location autocomplete)
//! - `GEMINI_API_KEY` - generative model credential (AI summaries)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - log level (default: info)
//! - `LOG_FORMAT` - log format: json (default) or text

use std::net::SocketAddr;

use tracing::{info, warn};

use wildmap_service::logging::{init_logging, LoggingConfig};
use wildmap_service::metrics::init_metrics;
use wildmap_service::{app, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env();
    init_logging(&logging_config);

    if let Err(e) = init_metrics() {
        // Log but don't fail - metrics are optional
        warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = AppConfig::from_env();
    let state = AppState::from_config(&config)?;

    if !state.has_places() {
        warn!("GOOGLE_MAPS_API_KEY not set, location autocomplete will return 500");
    }
    if !state.has_summaries() {
        warn!("GEMINI_API_KEY not set, AI summaries will return 500");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "starting wildmap service");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
