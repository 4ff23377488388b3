//! Address-component normalization for enriched place results.
//!
//! The mapping service returns typed address components; this module derives
//! the human-readable `display_short` / `display_full` strings attached to
//! every normalized place result.

use serde::{Deserialize, Serialize};

/// A typed address component as returned by the place details endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Human-readable display strings derived from address components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayAddress {
    /// `locality, admin area, postal code` with empty segments omitted.
    pub short: Option<String>,
    /// Street-based synthesized address when a street is present, otherwise
    /// the upstream formatted address.
    pub full: Option<String>,
}

/// Find the long name of the first component carrying the given type tag.
pub fn pick_component<'a>(components: &'a [AddressComponent], kind: &str) -> Option<&'a str> {
    components
        .iter()
        .find(|c| c.types.iter().any(|t| t == kind))
        .map(|c| c.long_name.as_str())
}

/// Derive the short and full display strings for a place.
///
/// Locality falls back through `locality -> postal_town -> sublocality`.
/// When a street number or route is present the full string is synthesized
/// as `street, locality, admin, postal` (empty segments omitted); otherwise
/// it falls back to the upstream formatted address.
pub fn display_address(
    components: &[AddressComponent],
    formatted_address: Option<&str>,
) -> DisplayAddress {
    let street_number = pick_component(components, "street_number");
    let route = pick_component(components, "route");
    let locality = pick_component(components, "locality")
        .or_else(|| pick_component(components, "postal_town"))
        .or_else(|| pick_component(components, "sublocality"));
    let admin = pick_component(components, "administrative_area_level_1");
    let postal = pick_component(components, "postal_code");

    let street = join_present(&[street_number, route], " ");

    let full = match street {
        Some(street) => join_present(&[Some(street.as_str()), locality, admin, postal], ", "),
        None => formatted_address
            .map(str::to_string)
            .filter(|s| !s.is_empty()),
    };

    let short = join_present(&[locality, admin, postal], ", ");

    DisplayAddress { short, full }
}

/// Join present, non-empty segments with a separator; `None` when nothing
/// survives.
fn join_present(parts: &[Option<&str>], separator: &str) -> Option<String> {
    let joined = parts
        .iter()
        .filter_map(|p| *p)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator);

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
