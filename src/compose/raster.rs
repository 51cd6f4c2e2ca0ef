//! Raster composition
//!
//! Each cropped raster is materialized as a static image resource in the
//! output document (a JPEG-encoded image XObject, built in memory) and drawn
//! at its placement rectangle. The content-stream operator scales the image
//! XObject's unit square to the placed size:
//!
//! ```text
//! q <w> 0 0 <h> <x> <y> cm /ImN Do Q
//! ```

use std::io::Cursor;

use image::DynamicImage;
use lopdf::{Dictionary, Object, Stream};

use crate::error::{SheetError, SheetResult};
use crate::extract::RasterArtifact;
use crate::geometry::Rect;
use crate::layout::CanvasSpec;

use super::{finalize_single_page, new_output_document};

/// JPEG quality for materialized illustration images.
const JPEG_QUALITY: u8 = 90;

/// Compose the output sheet from raster artifacts and their placements.
///
/// `items` is already truncated to grid capacity and ordered by input.
pub fn compose(canvas: &CanvasSpec, items: &[(RasterArtifact, Rect)]) -> SheetResult<Vec<u8>> {
    let (mut output, pages_id) = new_output_document();

    let mut content_ops = Vec::with_capacity(items.len());
    let mut xobjects = Dictionary::new();

    for (idx, (artifact, placement)) in items.iter().enumerate() {
        let image_id = output.add_object(image_xobject(artifact)?);
        let name = format!("Im{}", idx);
        xobjects.set(name.as_bytes(), Object::Reference(image_id));

        tracing::debug!(
            index = idx,
            x = placement.x0,
            y = placement.y0,
            width = placement.width(),
            height = placement.height(),
            "Placed raster artifact"
        );

        content_ops.push(format!(
            "q {} 0 0 {} {} {} cm /{} Do Q\n",
            placement.width(),
            placement.height(),
            placement.x0,
            placement.y0,
            name
        ));
    }

    finalize_single_page(output, pages_id, canvas, content_ops, xobjects)
}

/// Encode one artifact as a DCTDecode (JPEG) image XObject stream.
fn image_xobject(artifact: &RasterArtifact) -> SheetResult<Stream> {
    let width = artifact.image.width();
    let height = artifact.image.height();

    // JPEG carries no alpha channel; illustrations are opaque page regions
    let rgb = DynamicImage::ImageRgba8(artifact.image.clone()).to_rgb8();
    let mut jpeg = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
        Cursor::new(&mut jpeg),
        JPEG_QUALITY,
    );
    rgb.write_with_encoder(encoder)
        .map_err(|e| SheetError::Compose(format!("JPEG encoding failed: {}", e)))?;

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));

    // The stream payload is already DCT-compressed
    Ok(Stream::new(dict, jpeg).with_compression(false))
}
