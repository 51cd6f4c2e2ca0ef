//! Sheet pipeline error types
//!
//! One taxonomy covers the whole request: validation failures short-circuit
//! before any decode work, and any single document's failure aborts the batch
//! (a silent skip would shift every later grid placement). Client input
//! problems map to 400-class statuses, internal failures to 500-class.

use axum::http::StatusCode;
use thiserror::Error;

/// Unified error type for sheet composition requests.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Bad upload batch (count, filename, missing field). No decode work has
    /// been attempted when this is returned.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// A specific input document could not be decoded or rasterized. Aborts
    /// the whole batch; the message names the failing input.
    #[error("Failed to decode '{input}': {reason}")]
    Decode { input: String, reason: String },

    /// An input document has no pages at all.
    #[error("Document '{0}' has no pages")]
    EmptyDocument(String),

    /// Degenerate artifact geometry (zero-height crop, zero-area clamp).
    #[error("Invalid artifact geometry: {0}")]
    InvalidArtifact(String),

    /// The output document could not be assembled or serialized.
    #[error("Failed to compose output: {0}")]
    Compose(String),
}

impl SheetError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SheetError::Validation(_) => StatusCode::BAD_REQUEST,
            SheetError::Decode { .. } => StatusCode::BAD_REQUEST,
            SheetError::EmptyDocument(_) => StatusCode::BAD_REQUEST,
            SheetError::InvalidArtifact(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SheetError::Compose(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the error payload.
    pub fn code(&self) -> &'static str {
        match self {
            SheetError::Validation(_) => "VALIDATION",
            SheetError::Decode { .. } => "DECODE",
            SheetError::EmptyDocument(_) => "EMPTY_DOCUMENT",
            SheetError::InvalidArtifact(_) => "INVALID_ARTIFACT",
            SheetError::Compose(_) => "COMPOSE",
        }
    }
}

impl From<lopdf::Error> for SheetError {
    fn from(err: lopdf::Error) -> Self {
        SheetError::Compose(err.to_string())
    }
}

/// Result alias for sheet operations.
pub type SheetResult<T> = Result<T, SheetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_400_class() {
        assert_eq!(
            SheetError::Validation("no files".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SheetError::Decode {
                input: "a.pdf".into(),
                reason: "corrupt xref".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SheetError::EmptyDocument("a.pdf".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_errors_are_500_class() {
        assert_eq!(
            SheetError::InvalidArtifact("zero height".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            SheetError::Compose("stream limit".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_decode_error_names_the_input() {
        let err = SheetError::Decode {
            input: "third.pdf".into(),
            reason: "rasterization timed out".into(),
        };
        assert!(err.to_string().contains("third.pdf"));
    }
}
