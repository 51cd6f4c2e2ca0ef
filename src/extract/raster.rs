//! Raster extraction strategy
//!
//! Rasterizes page 1 with MuPDF at the configured DPI, then crops the
//! illustration region in pixel space. The crop box arrives in document
//! points with a top-left-down origin (matching raster row order), so the
//! whole rectangle is converted to pixels before cropping and never the
//! other way around.

use image::RgbaImage;
use mupdf::{Colorspace, Document, Matrix};

use crate::error::{SheetError, SheetResult};
use crate::geometry::{Origin, Rect, POINTS_PER_INCH};

use super::RasterArtifact;

/// Rasterize page 1 of `bytes` and crop `crop_box` out of it.
///
/// `crop_box` is in document points, top-left-down. Crop bounds are
/// floor-truncated to integer pixels and clamped to the rendered image; a
/// crop that degenerates to zero area after clamping is rejected.
pub fn extract(bytes: &[u8], input: &str, crop_box: Rect, dpi: f32) -> SheetResult<RasterArtifact> {
    debug_assert_eq!(crop_box.origin, Origin::TopLeftDown);

    let doc = Document::from_bytes(bytes, "application/pdf").map_err(|e| SheetError::Decode {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    let page_count = doc.page_count().map_err(|e| SheetError::Decode {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    if page_count == 0 {
        return Err(SheetError::EmptyDocument(input.to_string()));
    }

    let page = doc.load_page(0).map_err(|e| SheetError::Decode {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    let scale = dpi / POINTS_PER_INCH;
    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();
    let pixmap = page
        .to_pixmap(&matrix, &colorspace, true, true)
        .map_err(|e| SheetError::Decode {
            input: input.to_string(),
            reason: format!("rasterization failed: {}", e),
        })?;

    let full_page = pixmap_to_rgba(&pixmap).ok_or_else(|| SheetError::Decode {
        input: input.to_string(),
        reason: "rasterizer produced an invalid pixel buffer".to_string(),
    })?;

    tracing::debug!(
        input,
        width = full_page.width(),
        height = full_page.height(),
        dpi,
        "Rasterized page 1"
    );

    let cropped = crop_pixels(&full_page, crop_box.to_pixel_space(dpi))?;

    Ok(RasterArtifact {
        image: cropped,
        dpi,
    })
}

/// Convert a MuPDF pixmap to an RGBA image buffer.
fn pixmap_to_rgba(pixmap: &mupdf::Pixmap) -> Option<RgbaImage> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgba_buffer = Vec::with_capacity((width * height * 4) as usize);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            let a = if n >= 4 {
                samples.get(offset + 3).copied().unwrap_or(255)
            } else {
                255
            };
            rgba_buffer.extend_from_slice(&[r, g, b, a]);
        }
    }

    RgbaImage::from_raw(width, height, rgba_buffer)
}

/// Crop `image` to `crop_px`, a top-left-down rectangle in pixel space.
///
/// Bounds are floor-truncated, then clamped to the image extents. Clamping
/// (rather than erroring) keeps a slightly-off measured crop box usable; a
/// crop left with zero area is still an error.
fn crop_pixels(image: &RgbaImage, crop_px: Rect) -> SheetResult<RgbaImage> {
    let x0 = (crop_px.x0.floor().max(0.0) as u32).min(image.width());
    let y0 = (crop_px.y0.floor().max(0.0) as u32).min(image.height());
    let x1 = (crop_px.x1.floor().max(0.0) as u32).min(image.width());
    let y1 = (crop_px.y1.floor().max(0.0) as u32).min(image.height());

    if x1 <= x0 || y1 <= y0 {
        return Err(SheetError::InvalidArtifact(format!(
            "crop rectangle ({}, {})-({}, {}) lies outside the {}x{} page image",
            x0,
            y0,
            x1,
            y1,
            image.width(),
            image.height()
        )));
    }

    Ok(image::imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image())
}
