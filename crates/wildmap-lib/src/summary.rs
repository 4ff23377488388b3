//! Generative-model client for place and species summaries.
//!
//! Each summary is one `generateContent` call constrained to a declared JSON
//! schema. The returned text is deserialized into a typed summary struct so a
//! malformed model response surfaces as a schema error instead of leaking
//! through to the client. An empty model response parses to the default
//! (empty-field) summary, not an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};

/// Default base URL for the generative model API.
pub const DEFAULT_SUMMARY_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for all summary generations.
pub const SUMMARY_MODEL: &str = "gemini-2.5-flash";

const SERVICE_NAME: &str = "generative model";

/// Place-level summary: nature description, common species, and a fun fact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceSummary {
    pub description: String,
    pub most_common_species_found_there: Vec<SpeciesHighlight>,
    pub wildlife_fun_fact: String,
}

/// One species entry inside a place summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeciesHighlight {
    pub id: String,
    pub name: String,
    pub scientific_name: String,
}

/// Species-level summary keyed by scientific name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeciesSummary {
    pub description: String,
    pub habitat_and_range: String,
    pub diet: String,
    pub behavior: String,
    pub conservation_status: String,
    pub fun_fact: String,
}

/// Client for the generative model API.
pub struct SummaryClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SummaryClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::MissingCredential { service: "Gemini" });
        }

        let http = reqwest::Client::builder()
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: DEFAULT_SUMMARY_BASE_URL.to_string(),
        })
    }

    /// Override the upstream base URL. Tests point this at a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Generate the nature/biodiversity summary for a place name.
    pub async fn place_summary(&self, place_name: &str) -> Result<PlaceSummary> {
        let text = self
            .generate(&place_prompt(place_name), place_schema())
            .await?;
        parse_summary(&text)
    }

    /// Generate the biology summary for a scientific name.
    pub async fn species_summary(&self, scientific_name: &str) -> Result<SpeciesSummary> {
        let text = self
            .generate(&species_prompt(scientific_name), species_schema())
            .await?;
        parse_summary(&text)
    }

    async fn generate(&self, prompt: &str, schema: serde_json::Value) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, SUMMARY_MODEL);
        debug!(url = %url, "requesting summary generation");

        let payload: GeneratePayload = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&generate_request(prompt, schema))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response_text(&payload))
    }
}

#[derive(Debug, Deserialize)]
struct GeneratePayload {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Concatenated text of the first candidate; empty when the model returned
/// no text.
fn response_text(payload: &GeneratePayload) -> String {
    payload
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

/// Parse the model's text into a typed summary.
///
/// Empty text parses to the default summary. Any JSON the model returns must
/// deserialize into the declared shape; a mismatch is a schema error.
fn parse_summary<T: DeserializeOwned + Default>(text: &str) -> Result<T> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(trimmed).map_err(|e| Error::SchemaMismatch {
        service: SERVICE_NAME,
        message: e.to_string(),
    })
}

fn generate_request(prompt: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema,
        }
    })
}

fn place_prompt(place_name: &str) -> String {
    format!(
        "Provide:\n\
         1. A short paragraph describing the nature, ecosystems, and biodiversity of {place_name}.\n\
         2. A list of 5 of the most common wildlife species found there (realistic species).\n\
         3. One interesting wildlife-related fun fact about the region.\n\
         Focus ONLY on nature and ecology. Format following the schema."
    )
}

fn species_prompt(scientific_name: &str) -> String {
    format!(
        "You are a wildlife biology assistant. Given the scientific name \"{scientific_name}\", \
         return the following info in JSON format:\n\
         1. A short paragraph (2-3 sentences) describing what the species looks like, where it's found, and what makes it unique.\n\
         2. Its typical habitat and geographic range.\n\
         3. Its diet (what it eats).\n\
         4. Notable behaviors (e.g. social habits, migration, vocalizations, etc.).\n\
         5. Its conservation status (e.g. endangered, least concern).\n\
         6. One surprising or interesting fun fact about this species.\n\
         If information is unknown, respond with \"Unknown\". Use simple, engaging language."
    )
}

fn place_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "description": { "type": "STRING" },
            "mostCommonSpeciesFoundThere": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "name": { "type": "STRING" },
                        "scientificName": { "type": "STRING" },
                    },
                    "propertyOrdering": ["id", "name", "scientificName"],
                },
            },
            "wildlifeFunFact": { "type": "STRING" },
        },
        "propertyOrdering": ["description", "mostCommonSpeciesFoundThere", "wildlifeFunFact"],
    })
}

fn species_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "description": { "type": "STRING" },
            "habitatAndRange": { "type": "STRING" },
            "diet": { "type": "STRING" },
            "behavior": { "type": "STRING" },
            "conservationStatus": { "type": "STRING" },
            "funFact": { "type": "STRING" },
        },
        "propertyOrdering": [
            "description",
            "habitatAndRange",
            "diet",
            "behavior",
            "conservationStatus",
            "funFact"
        ],
    })
}

fn user_agent() -> String {
    format!("wildmap-lib/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_rejects_empty_api_key() {
        assert!(matches!(
            SummaryClient::new(""),
            Err(Error::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_empty_text_parses_to_default() {
        let summary: PlaceSummary = parse_summary("").unwrap();
        assert_eq!(summary, PlaceSummary::default());

        let summary: SpeciesSummary = parse_summary("   ").unwrap();
        assert_eq!(summary, SpeciesSummary::default());
    }

    #[test]
    fn test_empty_object_parses_to_default() {
        let summary: PlaceSummary = parse_summary("{}").unwrap();
        assert_eq!(summary.description, "");
        assert!(summary.most_common_species_found_there.is_empty());
    }

    #[test]
    fn test_place_summary_parses_camel_case_fields() {
        let text = json!({
            "description": "A green place.",
            "mostCommonSpeciesFoundThere": [
                {"id": "1", "name": "Red Fox", "scientificName": "Vulpes vulpes"}
            ],
            "wildlifeFunFact": "Foxes live here."
        })
        .to_string();

        let summary: PlaceSummary = parse_summary(&text).unwrap();
        assert_eq!(summary.description, "A green place.");
        assert_eq!(summary.most_common_species_found_there.len(), 1);
        assert_eq!(
            summary.most_common_species_found_there[0].scientific_name,
            "Vulpes vulpes"
        );
        assert_eq!(summary.wildlife_fun_fact, "Foxes live here.");
    }

    #[test]
    fn test_species_summary_round_trips_wire_keys() {
        let summary = SpeciesSummary {
            description: "Small and red.".to_string(),
            habitat_and_range: "Woodlands".to_string(),
            diet: "Omnivore".to_string(),
            behavior: "Nocturnal".to_string(),
            conservation_status: "Least concern".to_string(),
            fun_fact: "Can hear rodents underground.".to_string(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["habitatAndRange"], "Woodlands");
        assert_eq!(json["conservationStatus"], "Least concern");
        assert_eq!(json["funFact"], "Can hear rodents underground.");
    }

    #[test]
    fn test_type_mismatch_is_schema_error() {
        let result: Result<SpeciesSummary> = parse_summary(r#"{"description": 42}"#);
        match result.unwrap_err() {
            Error::SchemaMismatch { .. } => {}
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_is_schema_error() {
        let result: Result<PlaceSummary> = parse_summary("not json at all");
        assert!(matches!(result, Err(Error::SchemaMismatch { .. })));
    }

    #[test]
    fn test_response_text_concatenates_first_candidate() {
        let payload: GeneratePayload = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(response_text(&payload), "{\"a\":1}");
    }

    #[test]
    fn test_response_text_empty_without_candidates() {
        let payload: GeneratePayload = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response_text(&payload), "");
    }

    #[test]
    fn test_generate_request_declares_json_mime() {
        let request = generate_request("prompt here", place_schema());
        assert_eq!(
            request["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(request["contents"][0]["parts"][0]["text"], "prompt here");
    }

    #[test]
    fn test_schemas_declare_property_ordering() {
        let place = place_schema();
        assert_eq!(place["propertyOrdering"][1], "mostCommonSpeciesFoundThere");

        let species = species_schema();
        assert_eq!(species["propertyOrdering"][5], "funFact");
    }

    #[test]
    fn test_prompts_embed_caller_input() {
        assert!(place_prompt("Yellowstone").contains("Yellowstone"));
        assert!(species_prompt("Vulpes vulpes").contains("\"Vulpes vulpes\""));
    }
}
