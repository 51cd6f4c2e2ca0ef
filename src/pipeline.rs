//! Request-scoped sheet pipeline
//!
//! One request runs one pipeline: extract the illustration from each upload
//! in parallel, collect the artifacts back into input order, plan the grid,
//! compose the output. Grid position depends on input order, so any single
//! document's failure aborts the whole batch; a silent skip would shift
//! every later placement.
//!
//! Extraction is CPU-bound MuPDF/lopdf work, so it runs on the blocking
//! pool under a per-document timeout. Nothing here outlives the request:
//! dropping the returned future (client disconnect) abandons the remaining
//! work and no partial output is ever produced.

use tokio::task;
use tokio::time::{timeout, Duration};

use crate::compose;
use crate::config::SheetConfig;
use crate::error::{SheetError, SheetResult};
use crate::extract::{self, PageArtifact};
use crate::layout::{center_only, fit_and_center, CanvasSpec};

/// One uploaded document, already read off the wire.
pub struct SheetInput {
    /// Client-supplied filename, used to attribute failures.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Run the whole pipeline for one request and return the output PDF bytes.
pub async fn compose_sheet(config: &SheetConfig, inputs: Vec<SheetInput>) -> SheetResult<Vec<u8>> {
    if inputs.is_empty() {
        return Err(SheetError::Validation("no documents provided".to_string()));
    }

    tracing::info!(
        documents = inputs.len(),
        strategy = ?config.strategy,
        "Composing sheet"
    );

    let per_document = Duration::from_secs(config.decode_timeout_secs);

    // try_join_all preserves input order and aborts on the first failure
    let extractions = inputs.into_iter().map(|input| {
        let config = config.clone();
        async move {
            let name = input.name.clone();
            let timeout_secs = config.decode_timeout_secs;
            let outcome = timeout(
                per_document,
                task::spawn_blocking(move || {
                    extract::extract_page_one(&config, &input.name, &input.bytes)
                }),
            )
            .await;

            match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(join_error)) => Err(SheetError::Decode {
                    input: name,
                    reason: format!("extraction task failed: {}", join_error),
                }),
                Err(_) => Err(SheetError::Decode {
                    input: name,
                    reason: format!("decoding timed out after {}s", timeout_secs),
                }),
            }
        }
    });

    let artifacts = futures::future::try_join_all(extractions).await?;

    if artifacts.len() > config.canvas.capacity() {
        tracing::debug!(
            dropped = artifacts.len() - config.canvas.capacity(),
            capacity = config.canvas.capacity(),
            "Truncating artifacts past grid capacity"
        );
    }

    let canvas = config.canvas;
    let scale_fix = config.scale_fix;
    let output = task::spawn_blocking(move || plan_and_compose(&canvas, scale_fix, artifacts))
        .await
        .map_err(|e| SheetError::Compose(format!("composition task failed: {}", e)))??;

    tracing::info!(bytes = output.len(), "Sheet composed");
    Ok(output)
}

/// Plan a placement for each artifact and hand the pairs to the composer.
///
/// Raster artifacts are scaled to fit their cell (with the calibration
/// multiplier); vector artifacts are translate-only and keep their exact
/// point dimensions. Artifacts past grid capacity are dropped here.
fn plan_and_compose(
    canvas: &CanvasSpec,
    scale_fix: f32,
    artifacts: Vec<PageArtifact>,
) -> SheetResult<Vec<u8>> {
    tracing::debug!(
        cell_width = canvas.cell_width(),
        cell_height = canvas.cell_height(),
        "Planning grid placements"
    );

    let mut raster_items = Vec::new();
    let mut vector_items = Vec::new();

    for (idx, artifact) in artifacts.into_iter().enumerate() {
        let Some(cell) = canvas.cell_rect(idx) else {
            break;
        };
        match artifact {
            PageArtifact::Raster(a) => {
                let placement = fit_and_center(
                    cell,
                    a.image.width() as f32,
                    a.image.height() as f32,
                    scale_fix,
                )?;
                raster_items.push((a, placement));
            }
            PageArtifact::Vector(a) => {
                let placement = center_only(cell, a.crop.width(), a.crop.height());
                vector_items.push((a, placement));
            }
        }
    }

    if !vector_items.is_empty() {
        compose::vector::compose(canvas, &vector_items)
    } else {
        compose::raster::compose(canvas, &raster_items)
    }
}
