//! Region extraction from uploaded documents
//!
//! One artifact per input document: the illustration region of page 1,
//! produced by whichever strategy the deployment runs. Artifacts are
//! strategy-tagged and carry their own dimensions and origin convention so
//! downstream code queries instead of assuming.
//!
//! The two strategies deliberately work in different coordinate systems:
//! raster crops in pixel space (top-left-down, matching row order), vector
//! crops in document point space (bottom-left-up, PDF native).

pub mod raster;
pub mod vector;

use image::RgbaImage;

use crate::config::{SheetConfig, Strategy};
use crate::error::SheetResult;
use crate::geometry::{Origin, Rect};

/// The extracted illustration region of one input document.
pub enum PageArtifact {
    Raster(RasterArtifact),
    Vector(VectorArtifact),
}

/// A pixel crop of the rasterized first page.
pub struct RasterArtifact {
    /// Cropped region, RGBA.
    pub image: RgbaImage,
    /// Resolution the page was rasterized at.
    pub dpi: f32,
}

/// A point-space crop of the first page's content, no resampling.
pub struct VectorArtifact {
    /// The parsed source document; owned by this request.
    pub doc: lopdf::Document,
    /// Page 1's object id within `doc`.
    pub page_id: lopdf::ObjectId,
    /// Visible region in the page's point space, bottom-left-up.
    pub crop: Rect,
}

impl PageArtifact {
    /// Artifact width in its native units (pixels or points).
    pub fn width(&self) -> f32 {
        match self {
            PageArtifact::Raster(r) => r.image.width() as f32,
            PageArtifact::Vector(v) => v.crop.width(),
        }
    }

    /// Artifact height in its native units (pixels or points).
    pub fn height(&self) -> f32 {
        match self {
            PageArtifact::Raster(r) => r.image.height() as f32,
            PageArtifact::Vector(v) => v.crop.height(),
        }
    }

    /// Origin convention of the artifact's own coordinate system.
    pub fn origin(&self) -> Origin {
        match self {
            PageArtifact::Raster(_) => Origin::TopLeftDown,
            PageArtifact::Vector(_) => Origin::BottomLeftUp,
        }
    }
}

/// Extract the illustration region from page 1 of one document.
///
/// CPU-bound; the pipeline calls this on the blocking pool. `input` is the
/// uploaded filename, used to attribute failures to the right document.
pub fn extract_page_one(
    config: &SheetConfig,
    input: &str,
    bytes: &[u8],
) -> SheetResult<PageArtifact> {
    match config.strategy {
        Strategy::Raster => raster::extract(bytes, input, config.crop_box, config.dpi as f32)
            .map(PageArtifact::Raster),
        Strategy::Vector => {
            vector::extract(bytes, input, config.crop_box).map(PageArtifact::Vector)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_artifact_reports_pixel_dimensions() {
        let artifact = PageArtifact::Raster(RasterArtifact {
            image: RgbaImage::new(438, 1196),
            dpi: 300.0,
        });
        assert_eq!(artifact.width(), 438.0);
        assert_eq!(artifact.height(), 1196.0);
        assert_eq!(artifact.origin(), Origin::TopLeftDown);
    }

    #[test]
    fn test_vector_artifact_reports_point_dimensions() {
        let artifact = PageArtifact::Vector(VectorArtifact {
            doc: lopdf::Document::with_version("1.7"),
            page_id: (1, 0),
            crop: Rect::new(Origin::BottomLeftUp, 55.0, 453.0, 160.0, 740.0),
        });
        assert_eq!(artifact.width(), 105.0);
        assert_eq!(artifact.height(), 287.0);
        assert_eq!(artifact.origin(), Origin::BottomLeftUp);
    }
}
