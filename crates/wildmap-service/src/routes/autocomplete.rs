//! Autocomplete handlers: location enrichment and species search.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use wildmap_lib::{NormalizedPlaceResult, SpeciesSuggestion};

use crate::error::{from_lib_error, ApiError};
use crate::extract::ApiQuery;
use crate::metrics::{record_places_enriched, record_upstream_failure};
use crate::routes::generate_request_id;
use crate::state::{AppState, MAPS_API_KEY_ENV};

#[derive(Debug, Deserialize)]
pub struct LocationsParams {
    #[serde(default)]
    pub input: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub results: Vec<NormalizedPlaceResult>,
}

/// Handle `GET /api/v1/autocomplete/locations`.
///
/// Free-text input in, enriched and normalized place results out, in
/// prediction order.
pub async fn locations(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocationsParams>,
) -> Result<Json<LocationsResponse>, ApiError> {
    let request_id = generate_request_id();

    let input = params.input.as_deref().map(str::trim).unwrap_or("");
    if input.is_empty() {
        return Err(ApiError::bad_request("Missing 'input' query parameter"));
    }

    let places = state.places().ok_or_else(|| {
        ApiError::configuration(format!(
            "Missing Google Maps API key (set {})",
            MAPS_API_KEY_ENV
        ))
    })?;

    info!(request_id = %request_id, input = %input, "handling location autocomplete");

    let results = places.enrich(input).await.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "location enrichment failed");
        record_upstream_failure("places");
        from_lib_error(&e, "Places Autocomplete error", http::StatusCode::BAD_GATEWAY)
    })?;

    info!(
        request_id = %request_id,
        results = results.len(),
        "location autocomplete completed"
    );
    record_places_enriched(results.len());

    Ok(Json(LocationsResponse { results }))
}

#[derive(Debug, Deserialize)]
pub struct SpeciesParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// Handle `GET /api/v1/autocomplete/species`.
pub async fn species(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SpeciesParams>,
) -> Result<Json<Vec<SpeciesSuggestion>>, ApiError> {
    let request_id = generate_request_id();

    let query = params.q.as_deref().map(str::trim).unwrap_or("");
    if query.is_empty() {
        return Err(ApiError::bad_request("Missing 'q' query parameter"));
    }

    info!(request_id = %request_id, query = %query, "handling species autocomplete");

    let suggestions = state.observations().species_search(query).await.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "species autocomplete failed");
        record_upstream_failure("observations");
        from_lib_error(
            &e,
            "Autocomplete fetch failed",
            http::StatusCode::INTERNAL_SERVER_ERROR,
        )
    })?;

    Ok(Json(suggestions))
}
