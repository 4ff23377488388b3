//! Mapping-service client: place predictions, detail lookups, and the
//! autocomplete enrichment fan-out.
//!
//! Enrichment issues one predictions request, then one detail lookup per
//! prediction in parallel. Individual detail failures drop that prediction
//! silently; partial success is the norm, not an error.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::{display_address, AddressComponent};
use crate::error::{Error, Result};

/// Default base URL for the place predictions / details endpoints.
pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Fixed search radius attached to every enriched result: 5 miles.
pub const SEARCH_RADIUS_METERS: f64 = 8046.72;
pub const SEARCH_RADIUS_MILES: f64 = 5.0;

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// A candidate place suggested by the mapping service for a partial query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacePrediction {
    pub place_id: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictionsPayload {
    status: String,
    #[serde(default)]
    predictions: Vec<PlacePrediction>,
}

#[derive(Debug, Deserialize)]
struct DetailPayload {
    status: String,
    result: Option<DetailRecord>,
}

#[derive(Debug, Deserialize)]
struct DetailRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    location: Option<LatLng>,
}

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// One prediction resolved into full address and geometry data.
#[derive(Debug, Clone)]
pub struct PlaceDetail {
    pub place_id: String,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub address_components: Vec<AddressComponent>,
    pub location: Option<LatLng>,
}

/// Normalized output shape for one enriched place result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedPlaceResult {
    pub place_id: String,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub display_short: Option<String>,
    pub display_full: Option<String>,
    pub location: LatLng,
    pub radius_m: f64,
    pub radius_miles: f64,
}

/// Client for the mapping service's predictions and details endpoints.
pub struct PlacesClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PlacesClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::MissingCredential {
                service: "Google Maps",
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: DEFAULT_PLACES_BASE_URL.to_string(),
        })
    }

    /// Override the upstream base URL. Tests point this at a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request the ranked prediction list for a free-text query, filtered to
    /// address-like results in a fixed display locale.
    pub async fn predictions(&self, input: &str) -> Result<Vec<PlacePrediction>> {
        let url = format!("{}/autocomplete/json", self.base_url);
        let payload: serde_json::Value = self
            .http
            .get(&url)
            .query(&[
                ("input", input),
                ("key", self.api_key.as_str()),
                ("types", "address"),
                ("language", "en"),
            ])
            .send()
            .await?
            .json()
            .await?;

        let parsed: PredictionsPayload = serde_json::from_value(payload.clone())?;
        if parsed.status != STATUS_OK && parsed.status != STATUS_ZERO_RESULTS {
            return Err(Error::UpstreamStatus {
                service: "places autocomplete",
                status: parsed.status,
                payload,
            });
        }

        Ok(parsed.predictions)
    }

    /// Resolve one prediction's place identifier into full detail data.
    pub async fn detail(&self, place_id: &str) -> Result<PlaceDetail> {
        let url = format!("{}/details/json", self.base_url);
        let payload: serde_json::Value = self
            .http
            .get(&url)
            .query(&[
                ("place_id", place_id),
                ("key", self.api_key.as_str()),
                ("fields", "name,formatted_address,address_component,geometry"),
            ])
            .send()
            .await?
            .json()
            .await?;

        let parsed: DetailPayload = serde_json::from_value(payload.clone())?;
        let record = match (parsed.status.as_str(), parsed.result) {
            (STATUS_OK, Some(record)) => record,
            (status, _) => {
                return Err(Error::UpstreamStatus {
                    service: "place details",
                    status: status.to_string(),
                    payload,
                })
            }
        };

        Ok(PlaceDetail {
            place_id: place_id.to_string(),
            name: record.name,
            formatted_address: record.formatted_address,
            address_components: record.address_components,
            location: record.geometry.and_then(|g| g.location),
        })
    }

    /// The autocomplete enrichment flow: predictions, then one detail lookup
    /// per prediction in parallel.
    ///
    /// Results keep the predictions-service ranking; predictions whose detail
    /// lookup fails, reports non-success, or lacks geometry vacate their slot.
    pub async fn enrich(&self, input: &str) -> Result<Vec<NormalizedPlaceResult>> {
        let predictions = self.predictions(input).await?;

        let lookups = predictions.iter().map(|p| self.resolve(p));
        let resolved = join_all(lookups).await;

        Ok(resolved.into_iter().flatten().collect())
    }

    async fn resolve(&self, prediction: &PlacePrediction) -> Option<NormalizedPlaceResult> {
        match self.detail(&prediction.place_id).await {
            Ok(detail) => normalize_detail(detail),
            Err(error) => {
                debug!(
                    place_id = %prediction.place_id,
                    error = %error,
                    "dropping prediction after failed detail lookup"
                );
                None
            }
        }
    }
}

/// Build the normalized result for one resolved detail.
///
/// Details without geometry are dropped: every returned result carries a
/// usable map location.
fn normalize_detail(detail: PlaceDetail) -> Option<NormalizedPlaceResult> {
    let location = detail.location?;
    let display = display_address(
        &detail.address_components,
        detail.formatted_address.as_deref(),
    );

    Some(NormalizedPlaceResult {
        place_id: detail.place_id,
        name: detail.name,
        formatted_address: detail.formatted_address,
        display_short: display.short,
        display_full: display.full,
        location,
        radius_m: SEARCH_RADIUS_METERS,
        radius_miles: SEARCH_RADIUS_MILES,
    })
}

fn user_agent() -> String {
    format!("wildmap-lib/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail_with(
        components: Vec<AddressComponent>,
        location: Option<LatLng>,
    ) -> PlaceDetail {
        PlaceDetail {
            place_id: "pid-1".to_string(),
            name: Some("Somewhere".to_string()),
            formatted_address: Some("1 Main St, Springfield".to_string()),
            address_components: components,
            location,
        }
    }

    #[test]
    fn test_new_rejects_empty_api_key() {
        assert!(matches!(
            PlacesClient::new("  "),
            Err(Error::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_radius_constants_are_five_miles() {
        assert_eq!(SEARCH_RADIUS_METERS, 5.0 * 1609.344);
        assert_eq!(SEARCH_RADIUS_MILES, 5.0);
    }

    #[test]
    fn test_normalize_detail_attaches_fixed_radius() {
        let detail = detail_with(vec![], Some(LatLng { lat: 1.0, lng: 2.0 }));
        let result = normalize_detail(detail).unwrap();
        assert_eq!(result.radius_m, 8046.72);
        assert_eq!(result.radius_miles, 5.0);
        assert_eq!(result.location, LatLng { lat: 1.0, lng: 2.0 });
    }

    #[test]
    fn test_normalize_detail_drops_missing_geometry() {
        let detail = detail_with(vec![], None);
        assert!(normalize_detail(detail).is_none());
    }

    #[test]
    fn test_predictions_payload_parses() {
        let payload: PredictionsPayload = serde_json::from_value(json!({
            "status": "OK",
            "predictions": [
                {"place_id": "a", "description": "A Street"},
                {"place_id": "b"}
            ]
        }))
        .unwrap();
        assert_eq!(payload.status, "OK");
        assert_eq!(payload.predictions.len(), 2);
        assert_eq!(payload.predictions[0].place_id, "a");
        assert!(payload.predictions[1].description.is_none());
    }

    #[test]
    fn test_predictions_payload_defaults_to_empty_list() {
        let payload: PredictionsPayload =
            serde_json::from_value(json!({"status": "ZERO_RESULTS"})).unwrap();
        assert!(payload.predictions.is_empty());
    }

    #[test]
    fn test_detail_payload_parses_geometry() {
        let payload: DetailPayload = serde_json::from_value(json!({
            "status": "OK",
            "result": {
                "name": "Baker Street",
                "formatted_address": "221B Baker St, London NW1, UK",
                "address_components": [
                    {"long_name": "221B", "types": ["street_number"]},
                    {"long_name": "Baker St", "types": ["route"]}
                ],
                "geometry": {"location": {"lat": 51.52, "lng": -0.156}}
            }
        }))
        .unwrap();

        let record = payload.result.unwrap();
        assert_eq!(record.address_components.len(), 2);
        assert_eq!(record.geometry.unwrap().location.unwrap().lat, 51.52);
    }

    #[test]
    fn test_normalized_result_serializes_expected_keys() {
        let detail = detail_with(
            vec![AddressComponent {
                long_name: "London".to_string(),
                short_name: None,
                types: vec!["locality".to_string()],
            }],
            Some(LatLng { lat: 51.5, lng: -0.1 }),
        );
        let result = normalize_detail(detail).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["place_id"], "pid-1");
        assert_eq!(json["radius_m"], 8046.72);
        assert_eq!(json["display_short"], "London");
        assert_eq!(json["location"]["lng"], -0.1);
    }
}
