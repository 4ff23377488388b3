use thiserror::Error;

/// Convenient result alias for the wildmap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a required upstream credential is not configured.
    #[error("missing {service} API key")]
    MissingCredential { service: &'static str },

    /// Raised when an upstream service reported a non-success status in its
    /// response payload. The raw payload is kept for diagnostics.
    #[error("{service} returned status {status}")]
    UpstreamStatus {
        service: &'static str,
        status: String,
        payload: serde_json::Value,
    },

    /// Raised when a generative-model response does not deserialize into the
    /// declared summary schema.
    #[error("{service} response did not match the declared schema: {message}")]
    SchemaMismatch {
        service: &'static str,
        message: String,
    },

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_display() {
        let err = Error::MissingCredential { service: "Google Maps" };
        assert_eq!(err.to_string(), "missing Google Maps API key");
    }

    #[test]
    fn test_upstream_status_keeps_payload() {
        let err = Error::UpstreamStatus {
            service: "places autocomplete",
            status: "REQUEST_DENIED".to_string(),
            payload: serde_json::json!({"status": "REQUEST_DENIED"}),
        };
        assert!(err.to_string().contains("REQUEST_DENIED"));
        match err {
            Error::UpstreamStatus { payload, .. } => {
                assert_eq!(payload["status"], "REQUEST_DENIED");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = Error::SchemaMismatch {
            service: "generative model",
            message: "invalid type: integer, expected a string".to_string(),
        };
        assert!(err.to_string().contains("declared schema"));
    }
}
