//! Application state for the HTTP service.
//!
//! Upstream clients are explicit injectable handles built once at startup and
//! shared via axum's `State` extractor. A missing credential leaves that
//! client unconfigured; the owning handlers report the configuration error at
//! request time instead of failing startup.

use std::env;
use std::sync::Arc;

use wildmap_lib::{ObservationsClient, PlacesClient, Result as LibResult, SummaryClient};

/// Environment variable holding the mapping-service credential.
pub const MAPS_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Environment variable holding the generative-model credential.
pub const GENAI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Process-environment configuration for the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub google_maps_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub port: u16,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// - `GOOGLE_MAPS_API_KEY` - mapping service credential (optional)
    /// - `GEMINI_API_KEY` - generative model credential (optional)
    /// - `SERVICE_PORT` - HTTP port (default: 8080)
    pub fn from_env() -> Self {
        Self {
            google_maps_api_key: non_empty_var(MAPS_API_KEY_ENV),
            gemini_api_key: non_empty_var(GENAI_API_KEY_ENV),
            port: env::var("SERVICE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Shared application state for all axum handlers.
///
/// Cheaply cloneable (`Arc` internally).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    places: Option<PlacesClient>,
    observations: ObservationsClient,
    summaries: Option<SummaryClient>,
}

impl AppState {
    /// Build the state from configuration, constructing one client per
    /// configured upstream.
    pub fn from_config(config: &AppConfig) -> LibResult<Self> {
        let places = config
            .google_maps_api_key
            .as_deref()
            .map(PlacesClient::new)
            .transpose()?;

        let summaries = config
            .gemini_api_key
            .as_deref()
            .map(SummaryClient::new)
            .transpose()?;

        let observations = ObservationsClient::new()?;

        Ok(Self::from_clients(places, observations, summaries))
    }

    /// Assemble state from pre-built clients. Tests use this to inject
    /// clients pointed at stub upstreams.
    pub fn from_clients(
        places: Option<PlacesClient>,
        observations: ObservationsClient,
        summaries: Option<SummaryClient>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                places,
                observations,
                summaries,
            }),
        }
    }

    /// The mapping-service client, when its credential is configured.
    pub fn places(&self) -> Option<&PlacesClient> {
        self.inner.places.as_ref()
    }

    /// The observation-service client (no credential required).
    pub fn observations(&self) -> &ObservationsClient {
        &self.inner.observations
    }

    /// The generative-model client, when its credential is configured.
    pub fn summaries(&self) -> Option<&SummaryClient> {
        self.inner.summaries.as_ref()
    }

    pub fn has_places(&self) -> bool {
        self.inner.places.is_some()
    }

    pub fn has_summaries(&self) -> bool {
        self.inner.summaries.is_some()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("places_configured", &self.has_places())
            .field("summaries_configured", &self.has_summaries())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_state() -> AppState {
        AppState::from_clients(None, ObservationsClient::new().unwrap(), None)
    }

    #[test]
    fn test_state_without_credentials() {
        let state = bare_state();
        assert!(!state.has_places());
        assert!(!state.has_summaries());
        assert!(state.places().is_none());
        assert!(state.summaries().is_none());
    }

    #[test]
    fn test_state_clone_shares_inner() {
        let state = bare_state();
        let clone = state.clone();
        assert_eq!(state.has_places(), clone.has_places());
    }

    #[test]
    fn test_state_debug_reports_configuration() {
        let debug = format!("{:?}", bare_state());
        assert!(debug.contains("places_configured"));
        assert!(debug.contains("summaries_configured"));
    }

    #[test]
    fn test_from_env_port_defaults_to_8080() {
        std::env::remove_var("SERVICE_PORT");
        let config = AppConfig::from_env();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_from_config_builds_configured_clients() {
        let config = AppConfig {
            google_maps_api_key: Some("maps-key".to_string()),
            gemini_api_key: None,
            port: 8080,
        };
        let state = AppState::from_config(&config).unwrap();
        assert!(state.has_places());
        assert!(!state.has_summaries());
    }
}
