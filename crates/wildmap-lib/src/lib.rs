//! wildmap library entry points.
//!
//! This crate exposes typed clients for the three upstream services the API
//! fronts (place predictions/details, biodiversity observations, generative
//! summaries) plus the pure normalization logic between their payloads and
//! the wire shapes. The HTTP service should only depend on the types exported
//! here instead of reimplementing behavior.

#![deny(warnings)]

pub mod address;
pub mod error;
pub mod observations;
pub mod places;
pub mod summary;

pub use address::{display_address, pick_component, AddressComponent, DisplayAddress};
pub use error::{Error, Result};
pub use observations::{
    LocationObservationQuery, ObservationPage, ObservationRecord, ObservationsClient,
    SpeciesObservationQuery, SpeciesSuggestion,
};
pub use places::{
    LatLng, NormalizedPlaceResult, PlaceDetail, PlacePrediction, PlacesClient,
    SEARCH_RADIUS_METERS, SEARCH_RADIUS_MILES,
};
pub use summary::{PlaceSummary, SpeciesHighlight, SpeciesSummary, SummaryClient};
