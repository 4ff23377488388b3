//! Biodiversity-observation service client.
//!
//! Covers the three read paths the API exposes: observations filtered by
//! place, observations filtered by taxon, and the taxon search behind the
//! species autocomplete box. Queries translate present parameters 1:1 into
//! the upstream query string; absent optionals are omitted entirely.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Default base URL for the observation service API.
pub const DEFAULT_OBSERVATIONS_BASE_URL: &str = "https://api.inaturalist.org/v1";

const DEFAULT_ORDER: &str = "desc";
const DEFAULT_ORDER_BY: &str = "observed_on";
const DEFAULT_PER_PAGE: u32 = 200;

/// Query for observations within a known place.
///
/// `verifiable` is caller-overridable and defaults to `true`; the boolean
/// quality flags are sent upstream only when set.
#[derive(Debug, Clone)]
pub struct LocationObservationQuery {
    pub place_id: String,
    pub verifiable: bool,
    pub page: u32,
    pub order: String,
    pub order_by: String,
    pub per_page: u32,
    pub endemic: bool,
    pub threatened: bool,
    pub native: bool,
    pub iconic_taxa: Option<String>,
}

impl LocationObservationQuery {
    pub fn new(place_id: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            verifiable: true,
            page: 1,
            order: DEFAULT_ORDER.to_string(),
            order_by: DEFAULT_ORDER_BY.to_string(),
            per_page: DEFAULT_PER_PAGE,
            endemic: false,
            threatened: false,
            native: false,
            iconic_taxa: None,
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("verifiable", self.verifiable.to_string()),
            ("place_id", self.place_id.clone()),
            ("order", self.order.clone()),
            ("order_by", self.order_by.clone()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
        ];

        if self.endemic {
            pairs.push(("endemic", "true".to_string()));
        }
        if self.threatened {
            pairs.push(("threatened", "true".to_string()));
        }
        if self.native {
            pairs.push(("native", "true".to_string()));
        }
        if let Some(taxa) = &self.iconic_taxa {
            pairs.push(("iconic_taxa", taxa.clone()));
        }

        pairs
    }
}

/// Query for observations of a taxon, optionally bounded in space and time.
///
/// With no `taxon_id` the query returns unfiltered observations.
#[derive(Debug, Clone)]
pub struct SpeciesObservationQuery {
    pub taxon_id: Option<String>,
    pub verifiable: bool,
    pub page: u32,
    pub order: String,
    pub order_by: String,
    pub per_page: u32,
    pub nelat: Option<f64>,
    pub nelng: Option<f64>,
    pub swlat: Option<f64>,
    pub swlng: Option<f64>,
    pub d1: Option<String>,
    pub d2: Option<String>,
}

impl Default for SpeciesObservationQuery {
    fn default() -> Self {
        Self {
            taxon_id: None,
            verifiable: true,
            page: 1,
            order: DEFAULT_ORDER.to_string(),
            order_by: DEFAULT_ORDER_BY.to_string(),
            per_page: DEFAULT_PER_PAGE,
            nelat: None,
            nelng: None,
            swlat: None,
            swlng: None,
            d1: None,
            d2: None,
        }
    }
}

impl SpeciesObservationQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(taxon_id) = &self.taxon_id {
            pairs.push(("taxon_id", taxon_id.clone()));
        }
        pairs.push(("verifiable", self.verifiable.to_string()));
        pairs.push(("page", self.page.to_string()));
        pairs.push(("order", self.order.clone()));
        pairs.push(("order_by", self.order_by.clone()));
        pairs.push(("per_page", self.per_page.to_string()));

        if let Some(nelat) = self.nelat {
            pairs.push(("nelat", nelat.to_string()));
        }
        if let Some(nelng) = self.nelng {
            pairs.push(("nelng", nelng.to_string()));
        }
        if let Some(swlat) = self.swlat {
            pairs.push(("swlat", swlat.to_string()));
        }
        if let Some(swlng) = self.swlng {
            pairs.push(("swlng", swlng.to_string()));
        }
        if let Some(d1) = &self.d1 {
            pairs.push(("d1", d1.clone()));
        }
        if let Some(d2) = &self.d2 {
            pairs.push(("d2", d2.clone()));
        }

        pairs
    }
}

/// One observation record in the normalized output shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub observer: String,
    pub observer_link: Option<String>,
    pub observed_on: Option<String>,
    pub time_observed_at: Option<String>,
    pub location: String,
    pub place_guess: Option<String>,
    pub photos: Vec<PhotoRecord>,
    pub taxon: Option<TaxonRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub url: Option<String>,
    pub attribution: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonRecord {
    pub id: u64,
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
}

/// One page of normalized observation records, with pagination passed
/// through from upstream unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationPage {
    pub total_results: u64,
    pub page: u64,
    pub per_page: u64,
    pub observations: Vec<ObservationRecord>,
}

/// One suggestion for the species autocomplete box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesSuggestion {
    pub taxon_id: u64,
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObservationsPayload {
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    page: u64,
    #[serde(default)]
    per_page: u64,
    #[serde(default)]
    results: Vec<ObservationPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct ObservationPayload {
    user: Option<UserPayload>,
    observed_on_details: Option<ObservedOnDetails>,
    observed_on: Option<String>,
    time_observed_at: Option<String>,
    location: Option<String>,
    place_guess: Option<String>,
    #[serde(default)]
    photos: Vec<PhotoPayload>,
    taxon: Option<TaxonPayload>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Option<u64>,
    name: Option<String>,
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObservedOnDetails {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoPayload {
    url: Option<String>,
    attribution: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaxonPayload {
    id: u64,
    name: Option<String>,
    preferred_common_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "type")]
    result_type: Option<String>,
    record: Option<SearchRecord>,
}

#[derive(Debug, Deserialize)]
struct SearchRecord {
    id: u64,
    name: Option<String>,
    rank: Option<String>,
    preferred_common_name: Option<String>,
    default_photo: Option<DefaultPhoto>,
}

#[derive(Debug, Deserialize)]
struct DefaultPhoto {
    medium_url: Option<String>,
}

/// Client for the biodiversity-observation service.
pub struct ObservationsClient {
    http: reqwest::Client,
    base_url: String,
}

impl ObservationsClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_OBSERVATIONS_BASE_URL.to_string(),
        })
    }

    /// Override the upstream base URL. Tests point this at a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch one page of observations for a place.
    pub async fn by_location(&self, query: &LocationObservationQuery) -> Result<ObservationPage> {
        self.fetch_observations(query.query_pairs()).await
    }

    /// Fetch one page of observations for a taxon (or unfiltered).
    pub async fn by_species(&self, query: &SpeciesObservationQuery) -> Result<ObservationPage> {
        self.fetch_observations(query.query_pairs()).await
    }

    async fn fetch_observations(
        &self,
        pairs: Vec<(&'static str, String)>,
    ) -> Result<ObservationPage> {
        let url = format!("{}/observations", self.base_url);
        debug!(url = %url, params = pairs.len(), "querying observations");

        let payload: ObservationsPayload = self
            .http
            .get(&url)
            .query(&pairs)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(ObservationPage {
            total_results: payload.total_results,
            page: payload.page,
            per_page: payload.per_page,
            observations: payload.results.into_iter().map(map_observation).collect(),
        })
    }

    /// Search taxa for the species autocomplete box.
    ///
    /// Keeps taxon results only, and drops hybrid ranks.
    pub async fn species_search(&self, query: &str) -> Result<Vec<SpeciesSuggestion>> {
        let url = format!("{}/search", self.base_url);
        let payload: SearchPayload = self
            .http
            .get(&url)
            .query(&[("q", query), ("sources", "taxa")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(map_species_search(payload))
    }
}

/// Keep taxon results only, drop hybrid ranks, and map to suggestions.
fn map_species_search(payload: SearchPayload) -> Vec<SpeciesSuggestion> {
    payload
        .results
        .into_iter()
        .filter(|r| r.result_type.as_deref() == Some("Taxon"))
        .filter_map(|r| r.record)
        .filter(|record| record.rank.as_deref() != Some("hybrid"))
        .map(|record| SpeciesSuggestion {
            taxon_id: record.id,
            common_name: record.preferred_common_name,
            scientific_name: record.name,
            image: record.default_photo.and_then(|p| p.medium_url),
        })
        .collect()
}

/// Map one upstream observation into the normalized record shape.
///
/// Observer display name falls back `name -> login -> "Unknown"`; the
/// observer link is present only when the upstream user id exists.
fn map_observation(payload: ObservationPayload) -> ObservationRecord {
    let observer = payload
        .user
        .as_ref()
        .and_then(|u| u.name.clone().or_else(|| u.login.clone()))
        .unwrap_or_else(|| "Unknown".to_string());

    let observer_link = payload
        .user
        .as_ref()
        .and_then(|u| u.id)
        .map(|id| format!("https://www.inaturalist.org/people/{}", id));

    let observed_on = payload
        .observed_on_details
        .and_then(|d| d.date)
        .or(payload.observed_on);

    ObservationRecord {
        observer,
        observer_link,
        observed_on,
        time_observed_at: payload.time_observed_at,
        location: payload.location.unwrap_or_else(|| "Unknown".to_string()),
        place_guess: payload.place_guess,
        photos: payload
            .photos
            .into_iter()
            .map(|p| PhotoRecord {
                url: p.url,
                attribution: p.attribution,
            })
            .collect(),
        taxon: payload.taxon.map(|t| TaxonRecord {
            id: t.id,
            scientific_name: t.name,
            common_name: t.preferred_common_name,
        }),
    }
}

fn user_agent() -> String {
    format!("wildmap-lib/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair_value<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_location_query_defaults() {
        let query = LocationObservationQuery::new("12345");
        let pairs = query.query_pairs();

        assert_eq!(pair_value(&pairs, "verifiable"), Some("true"));
        assert_eq!(pair_value(&pairs, "place_id"), Some("12345"));
        assert_eq!(pair_value(&pairs, "order"), Some("desc"));
        assert_eq!(pair_value(&pairs, "order_by"), Some("observed_on"));
        assert_eq!(pair_value(&pairs, "per_page"), Some("200"));
        assert_eq!(pair_value(&pairs, "page"), Some("1"));
    }

    #[test]
    fn test_location_query_omits_unset_flags() {
        let query = LocationObservationQuery::new("12345");
        let pairs = query.query_pairs();

        assert_eq!(pair_value(&pairs, "endemic"), None);
        assert_eq!(pair_value(&pairs, "threatened"), None);
        assert_eq!(pair_value(&pairs, "native"), None);
        assert_eq!(pair_value(&pairs, "iconic_taxa"), None);
    }

    #[test]
    fn test_location_query_includes_set_flags() {
        let mut query = LocationObservationQuery::new("12345");
        query.endemic = true;
        query.iconic_taxa = Some("Aves,Mammalia".to_string());
        let pairs = query.query_pairs();

        assert_eq!(pair_value(&pairs, "endemic"), Some("true"));
        assert_eq!(pair_value(&pairs, "iconic_taxa"), Some("Aves,Mammalia"));
        assert_eq!(pair_value(&pairs, "threatened"), None);
    }

    #[test]
    fn test_location_query_verifiable_can_be_disabled() {
        let mut query = LocationObservationQuery::new("12345");
        query.verifiable = false;
        let pairs = query.query_pairs();
        assert_eq!(pair_value(&pairs, "verifiable"), Some("false"));
    }

    #[test]
    fn test_species_query_defaults_omit_taxon() {
        let query = SpeciesObservationQuery::default();
        let pairs = query.query_pairs();

        assert_eq!(pair_value(&pairs, "taxon_id"), None);
        assert_eq!(pair_value(&pairs, "verifiable"), Some("true"));
        assert_eq!(pair_value(&pairs, "per_page"), Some("200"));
        assert_eq!(pair_value(&pairs, "nelat"), None);
        assert_eq!(pair_value(&pairs, "d1"), None);
    }

    #[test]
    fn test_species_query_bounding_box_and_dates() {
        let query = SpeciesObservationQuery {
            taxon_id: Some("42".to_string()),
            nelat: Some(51.6),
            nelng: Some(-0.1),
            swlat: Some(51.3),
            swlng: Some(-0.5),
            d1: Some("2024-01-01".to_string()),
            d2: Some("2024-12-31".to_string()),
            ..SpeciesObservationQuery::default()
        };
        let pairs = query.query_pairs();

        assert_eq!(pair_value(&pairs, "taxon_id"), Some("42"));
        assert_eq!(pair_value(&pairs, "nelat"), Some("51.6"));
        assert_eq!(pair_value(&pairs, "swlng"), Some("-0.5"));
        assert_eq!(pair_value(&pairs, "d1"), Some("2024-01-01"));
        assert_eq!(pair_value(&pairs, "d2"), Some("2024-12-31"));
    }

    #[test]
    fn test_map_observation_full_record() {
        let payload: ObservationPayload = serde_json::from_value(json!({
            "user": {"id": 99, "name": "Jane Doe", "login": "jdoe"},
            "observed_on_details": {"date": "2024-06-01"},
            "observed_on": "2024-06-01T10:00:00Z",
            "time_observed_at": "2024-06-01T10:12:00Z",
            "location": "51.5,-0.1",
            "place_guess": "Hyde Park",
            "photos": [{"url": "https://img/1.jpg", "attribution": "(c) Jane"}],
            "taxon": {"id": 7, "name": "Vulpes vulpes", "preferred_common_name": "Red Fox"}
        }))
        .unwrap();

        let record = map_observation(payload);
        assert_eq!(record.observer, "Jane Doe");
        assert_eq!(
            record.observer_link.as_deref(),
            Some("https://www.inaturalist.org/people/99")
        );
        assert_eq!(record.observed_on.as_deref(), Some("2024-06-01"));
        assert_eq!(record.location, "51.5,-0.1");
        assert_eq!(record.photos.len(), 1);
        let taxon = record.taxon.unwrap();
        assert_eq!(taxon.scientific_name.as_deref(), Some("Vulpes vulpes"));
        assert_eq!(taxon.common_name.as_deref(), Some("Red Fox"));
    }

    #[test]
    fn test_map_observation_observer_fallbacks() {
        let login_only: ObservationPayload =
            serde_json::from_value(json!({"user": {"id": 1, "login": "anon42"}})).unwrap();
        assert_eq!(map_observation(login_only).observer, "anon42");

        let no_user: ObservationPayload = serde_json::from_value(json!({})).unwrap();
        let record = map_observation(no_user);
        assert_eq!(record.observer, "Unknown");
        assert_eq!(record.observer_link, None);
        assert_eq!(record.location, "Unknown");
        assert!(record.photos.is_empty());
        assert!(record.taxon.is_none());
    }

    #[test]
    fn test_map_observation_observed_on_fallback() {
        let payload: ObservationPayload =
            serde_json::from_value(json!({"observed_on": "2023-03-03"})).unwrap();
        assert_eq!(
            map_observation(payload).observed_on.as_deref(),
            Some("2023-03-03")
        );
    }

    #[test]
    fn test_search_payload_filters_to_taxa() {
        let payload: SearchPayload = serde_json::from_value(json!({
            "results": [
                {"type": "Taxon", "record": {"id": 1, "name": "Vulpes vulpes",
                 "rank": "species", "preferred_common_name": "Red Fox",
                 "default_photo": {"medium_url": "https://img/fox.jpg"}}},
                {"type": "Place", "record": {"id": 2, "name": "Foxton"}},
                {"type": "Taxon", "record": {"id": 3, "name": "Canis x", "rank": "hybrid"}}
            ]
        }))
        .unwrap();

        let suggestions = map_species_search(payload);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].taxon_id, 1);
        assert_eq!(suggestions[0].common_name.as_deref(), Some("Red Fox"));
        assert_eq!(suggestions[0].image.as_deref(), Some("https://img/fox.jpg"));
    }

    #[test]
    fn test_observation_page_serializes_pass_through_pagination() {
        let page = ObservationPage {
            total_results: 1234,
            page: 2,
            per_page: 200,
            observations: vec![],
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total_results"], 1234);
        assert_eq!(json["page"], 2);
        assert_eq!(json["per_page"], 200);
    }
}
