//! Sheet composition endpoint
//!
//! `POST /api/v1/sheets` accepts a multipart batch of 1-10 PDF uploads and
//! returns the composed grid sheet as a downloadable PDF. Validation happens
//! while the fields stream in and short-circuits before any decode work:
//! empty batches, more than [`MAX_DOCUMENTS`] files, and filenames without a
//! `.pdf` suffix are rejected up front.

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::SheetError;
use crate::pipeline::{self, SheetInput};
use crate::state::AppState;

/// Upper bound on documents per batch; the grid has exactly this many cells
/// in the reference deployment.
pub const MAX_DOCUMENTS: usize = 10;

/// Fixed download name of the composed sheet.
const OUTPUT_FILENAME: &str = "sheet.pdf";

/// Whole-request body limit: 10 documents of a few MB each plus overhead.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Error payload for failed requests.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl IntoResponse for SheetError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });
        (status, body).into_response()
    }
}

/// Create the sheets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(compose_sheet))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Compose a grid sheet from the uploaded documents.
async fn compose_sheet(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, SheetError> {
    let mut inputs: Vec<SheetInput> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        SheetError::Validation(format!("failed to read upload: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "files" && field_name != "file" {
            continue;
        }

        let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
        validate_filename(&filename)?;

        if inputs.len() == MAX_DOCUMENTS {
            return Err(SheetError::Validation(format!(
                "maximum {} documents allowed",
                MAX_DOCUMENTS
            )));
        }

        let bytes = field.bytes().await.map_err(|e| {
            SheetError::Validation(format!("failed to read '{}': {}", filename, e))
        })?;

        tracing::debug!(filename = %filename, bytes = bytes.len(), "Received document");
        inputs.push(SheetInput {
            name: filename,
            bytes: bytes.to_vec(),
        });
    }

    if inputs.is_empty() {
        return Err(SheetError::Validation("no documents provided".to_string()));
    }

    let output = pipeline::compose_sheet(&state.config().sheet, inputs).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", OUTPUT_FILENAME),
        )
        .body(Body::from(output))
        .map_err(|e| SheetError::Compose(format!("response assembly failed: {}", e)))?;

    Ok(response)
}

/// A document must arrive with a non-empty `.pdf` filename.
fn validate_filename(filename: &str) -> Result<(), SheetError> {
    if filename.is_empty() || !filename.to_lowercase().ends_with(".pdf") {
        return Err(SheetError::Validation(format!(
            "invalid file: '{}'",
            filename
        )));
    }
    Ok(())
}
