//! Prometheus metrics infrastructure.
//!
//! Provides the recorder setup, the `/metrics` endpoint handler, and the
//! domain metric helpers the route handlers call.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus metrics recorder. Call once at startup.
pub fn init_metrics() -> Result<(), MetricsError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

/// Axum handler for the `/metrics` endpoint.
///
/// Returns Prometheus exposition format text.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Errors that can occur during metrics initialization.
#[derive(Debug, Clone)]
pub enum MetricsError {
    /// The recorder has already been installed.
    AlreadyInitialized,
    /// The Prometheus builder failed to install.
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

/// Record one completed autocomplete enrichment and how many normalized
/// results it returned.
pub fn record_places_enriched(returned: usize) {
    metrics::counter!("wildmap_enrichment_requests_total").increment(1);
    metrics::histogram!("wildmap_enrichment_results").record(returned as f64);
}

/// Record one completed observation query.
pub fn record_observations_fetched(variant: &str, count: usize) {
    metrics::counter!(
        "wildmap_observation_queries_total",
        "variant" => variant.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "wildmap_observation_results",
        "variant" => variant.to_string()
    )
    .record(count as f64);
}

/// Record one generated AI summary.
pub fn record_summary_generated(kind: &str) {
    metrics::counter!(
        "wildmap_summaries_generated_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record a failed upstream call.
pub fn record_upstream_failure(service: &str) {
    metrics::counter!(
        "wildmap_upstream_failures_total",
        "service" => service.to_string()
    )
    .increment(1);
}
