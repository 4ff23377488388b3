//! Observation query handlers: by-location and by-species.
//!
//! Both variants translate present parameters 1:1 into the upstream query
//! and share one default policy: `verifiable` is caller-overridable and
//! defaults to `true`. Failures are all-or-nothing.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use wildmap_lib::{LocationObservationQuery, ObservationPage, SpeciesObservationQuery};

use crate::error::{from_lib_error, ApiError};
use crate::extract::ApiQuery;
use crate::metrics::{record_observations_fetched, record_upstream_failure};
use crate::routes::generate_request_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ByLocationParams {
    #[serde(default)]
    pub place_id: Option<String>,
    pub page: Option<u32>,
    pub order: Option<String>,
    pub order_by: Option<String>,
    pub per_page: Option<u32>,
    pub verifiable: Option<bool>,
    pub endemic: Option<bool>,
    pub threatened: Option<bool>,
    pub native: Option<bool>,
    pub iconic_taxa: Option<String>,
}

/// Handle `GET /api/v1/observations/by-location`.
pub async fn by_location(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ByLocationParams>,
) -> Result<Json<ObservationPage>, ApiError> {
    let request_id = generate_request_id();

    let place_id = match params.place_id.as_deref().map(str::trim) {
        Some(place_id) if !place_id.is_empty() => place_id.to_string(),
        _ => return Err(ApiError::bad_request("place_id is required")),
    };

    let mut query = LocationObservationQuery::new(place_id);
    if let Some(verifiable) = params.verifiable {
        query.verifiable = verifiable;
    }
    if let Some(page) = params.page {
        query.page = page;
    }
    if let Some(order) = params.order {
        query.order = order;
    }
    if let Some(order_by) = params.order_by {
        query.order_by = order_by;
    }
    if let Some(per_page) = params.per_page {
        query.per_page = per_page;
    }
    query.endemic = params.endemic.unwrap_or(false);
    query.threatened = params.threatened.unwrap_or(false);
    query.native = params.native.unwrap_or(false);
    query.iconic_taxa = params.iconic_taxa;

    info!(
        request_id = %request_id,
        place_id = %query.place_id,
        page = query.page,
        "handling observations by location"
    );

    let page = state
        .observations()
        .by_location(&query)
        .await
        .map_err(|e| {
            warn!(request_id = %request_id, error = %e, "location observations fetch failed");
            record_upstream_failure("observations");
            from_lib_error(
                &e,
                "Failed to fetch location observations",
                http::StatusCode::INTERNAL_SERVER_ERROR,
            )
        })?;

    record_observations_fetched("by_location", page.observations.len());

    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct BySpeciesParams {
    pub taxon_id: Option<String>,
    pub verifiable: Option<bool>,
    pub page: Option<u32>,
    pub order: Option<String>,
    pub order_by: Option<String>,
    pub per_page: Option<u32>,
    pub nelat: Option<f64>,
    pub nelng: Option<f64>,
    pub swlat: Option<f64>,
    pub swlng: Option<f64>,
    pub d1: Option<String>,
    pub d2: Option<String>,
}

/// Handle `GET /api/v1/observations/by-species`.
///
/// All parameters are optional; with no `taxon_id` the query returns
/// unfiltered observations.
pub async fn by_species(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BySpeciesParams>,
) -> Result<Json<ObservationPage>, ApiError> {
    let request_id = generate_request_id();

    let mut query = SpeciesObservationQuery {
        taxon_id: params.taxon_id,
        nelat: params.nelat,
        nelng: params.nelng,
        swlat: params.swlat,
        swlng: params.swlng,
        d1: params.d1,
        d2: params.d2,
        ..SpeciesObservationQuery::default()
    };
    if let Some(verifiable) = params.verifiable {
        query.verifiable = verifiable;
    }
    if let Some(page) = params.page {
        query.page = page;
    }
    if let Some(order) = params.order {
        query.order = order;
    }
    if let Some(order_by) = params.order_by {
        query.order_by = order_by;
    }
    if let Some(per_page) = params.per_page {
        query.per_page = per_page;
    }

    info!(
        request_id = %request_id,
        taxon_id = query.taxon_id.as_deref().unwrap_or("<none>"),
        page = query.page,
        "handling observations by species"
    );

    let page = state.observations().by_species(&query).await.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "species observations fetch failed");
        record_upstream_failure("observations");
        from_lib_error(
            &e,
            "Failed to fetch observations",
            http::StatusCode::INTERNAL_SERVER_ERROR,
        )
    })?;

    record_observations_fetched("by_species", page.observations.len());

    Ok(Json(page))
}
