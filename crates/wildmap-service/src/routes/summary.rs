//! AI summary handlers for places and species.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use wildmap_lib::{PlaceSummary, SpeciesSummary};

use crate::error::{from_lib_error, ApiError};
use crate::extract::ApiJson;
use crate::metrics::{record_summary_generated, record_upstream_failure};
use crate::routes::generate_request_id;
use crate::state::{AppState, GENAI_API_KEY_ENV};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSummaryRequest {
    #[serde(default)]
    pub place_name: Option<String>,
}

/// Handle `POST /api/v1/summary/place`.
pub async fn place(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PlaceSummaryRequest>,
) -> Result<Json<PlaceSummary>, ApiError> {
    let request_id = generate_request_id();

    let place_name = match body.place_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ApiError::bad_request("placeName is required")),
    };

    let summaries = state.summaries().ok_or_else(missing_genai_key)?;

    info!(request_id = %request_id, place_name = %place_name, "generating place summary");

    let summary = summaries.place_summary(&place_name).await.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "place summary generation failed");
        record_upstream_failure("summaries");
        from_lib_error(
            &e,
            "Failed to fetch description",
            http::StatusCode::BAD_GATEWAY,
        )
    })?;

    record_summary_generated("place");

    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesSummaryRequest {
    #[serde(default)]
    pub scientific_name: Option<String>,
}

/// Handle `POST /api/v1/summary/species`.
pub async fn species(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SpeciesSummaryRequest>,
) -> Result<Json<SpeciesSummary>, ApiError> {
    let request_id = generate_request_id();

    let scientific_name = match body.scientific_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ApiError::bad_request("scientificName is required")),
    };

    let summaries = state.summaries().ok_or_else(missing_genai_key)?;

    info!(
        request_id = %request_id,
        scientific_name = %scientific_name,
        "generating species summary"
    );

    let summary = summaries
        .species_summary(&scientific_name)
        .await
        .map_err(|e| {
            warn!(request_id = %request_id, error = %e, "species summary generation failed");
            record_upstream_failure("summaries");
            from_lib_error(
                &e,
                "Failed to fetch description",
                http::StatusCode::BAD_GATEWAY,
            )
        })?;

    record_summary_generated("species");

    Ok(Json(summary))
}

fn missing_genai_key() -> ApiError {
    ApiError::configuration(format!("Missing Gemini API key (set {})", GENAI_API_KEY_ENV))
}
