//! Health check handlers for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator, currently always "ok".
    pub status: String,

    /// Service name for identification.
    pub service: String,

    /// Service version from build-time.
    pub version: String,

    /// Whether the mapping-service credential is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub places_configured: Option<bool>,

    /// Whether the generative-model credential is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries_configured: Option<bool>,
}

impl HealthStatus {
    /// Create a healthy liveness status.
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            places_configured: None,
            summaries_configured: None,
        }
    }

    /// Create a ready status reporting which upstream clients are configured.
    pub fn ready(service: &str, version: &str, places: bool, summaries: bool) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            places_configured: Some(places),
            summaries_configured: Some(summaries),
        }
    }
}

/// Liveness probe handler: 200 OK whenever the process is serving.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// The service holds no preloaded data, so readiness reports which optional
/// upstream credentials are configured rather than gating on them; endpoints
/// backed by an unconfigured client answer with a configuration error.
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let status = HealthStatus::ready(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        state.has_places(),
        state.has_summaries(),
    );
    (StatusCode::OK, Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_alive() {
        let status = HealthStatus::alive("wildmap-service", "0.1.0");
        assert_eq!(status.status, "ok");
        assert!(status.places_configured.is_none());
    }

    #[test]
    fn test_health_status_ready_reports_flags() {
        let status = HealthStatus::ready("wildmap-service", "0.1.0", true, false);
        assert_eq!(status.places_configured, Some(true));
        assert_eq!(status.summaries_configured, Some(false));
    }

    #[test]
    fn test_health_status_serialization_skips_absent_flags() {
        let json = serde_json::to_string(&HealthStatus::alive("wildmap-service", "0.1.0")).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("places_configured"));
    }
}
