//! Error types for request decoding and validation

use thiserror::Error;

use crate::placement::PlacementError;

/// Errors that can occur while turning a JSON request into a query
#[derive(Error, Debug)]
pub enum RequestError {
    /// The payload is not valid JSON or does not match the schema
    #[error("Failed to parse request JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload decoded but describes an unusable query
    #[error("Invalid request: {0}")]
    Invalid(#[from] PlacementError),
}

impl RequestError {
    /// The validation error, if the payload itself was well-formed JSON
    pub fn as_placement_error(&self) -> Option<&PlacementError> {
        match self {
            RequestError::Invalid(err) => Some(err),
            RequestError::Json(_) => None,
        }
    }
}
