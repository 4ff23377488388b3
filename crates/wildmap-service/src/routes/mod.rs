//! HTTP route handlers.
//!
//! Handlers are thin: parse and validate parameters, call the library
//! clients, convert failures into the wire error shape.

pub mod autocomplete;
pub mod observations;
pub mod summary;

/// Generate a unique request ID for tracing.
pub(crate) fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    format!("req-{:x}", timestamp)
}
