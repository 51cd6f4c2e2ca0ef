//! Page geometry primitives
//!
//! # Coordinate Systems
//!
//! Two origin conventions coexist in this service:
//!
//! - **Top-left-down**: (0, 0) at the top-left corner, y increasing downward.
//!   This matches raster row ordering, so pixel crops use it.
//! - **Bottom-left-up**: (0, 0) at the bottom-left corner, y increasing
//!   upward. This is PDF's native convention; the output canvas and vector
//!   crops use it.
//!
//! Mixing the two silently is the classic defect in this kind of code, so
//! every rectangle carries an explicit [`Origin`] tag and the only way to
//! change it is [`Rect::with_origin`], which needs the enclosing frame height:
//!
//! ```text
//! flipped_y = frame_height - y
//! ```
//!
//! Point/pixel conversion is the other unit boundary: document point space is
//! fixed at 72 points per inch regardless of the raster resolution.

/// Points per inch in document point space.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert a value in document points to pixels at the given resolution.
pub fn to_pixels(points: f32, dpi: f32) -> f32 {
    points * dpi / POINTS_PER_INCH
}

/// Convert a value in pixels at the given resolution back to document points.
pub fn to_points(pixels: f32, dpi: f32) -> f32 {
    pixels * POINTS_PER_INCH / dpi
}

/// Origin convention of a rectangle's coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// (0, 0) top-left, y grows downward (raster row order).
    TopLeftDown,
    /// (0, 0) bottom-left, y grows upward (PDF native).
    BottomLeftUp,
}

/// An axis-aligned rectangle tagged with its origin convention.
///
/// Invariant: `x1 > x0` and `y1 > y0` for any rectangle describing a real
/// region. Degenerate rectangles are representable (they come out of
/// clamping) and are rejected where they matter, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Origin,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(origin: Origin, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { origin, x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Re-express this rectangle under another origin convention.
    ///
    /// `frame_height` is the height of the enclosing frame (page or image) in
    /// the same units as the rectangle. Flipping swaps which edge is `y0`:
    /// the result still satisfies `y1 > y0`. Converting to the tag the
    /// rectangle already carries is a no-op.
    pub fn with_origin(self, target: Origin, frame_height: f32) -> Rect {
        if self.origin == target {
            return self;
        }
        Rect {
            origin: target,
            x0: self.x0,
            y0: frame_height - self.y1,
            x1: self.x1,
            y1: frame_height - self.y0,
        }
    }

    /// Scale all four components from points to pixels at `dpi`.
    ///
    /// The origin tag is preserved; only the units change. Must be applied to
    /// the whole rectangle at once so no component is left in point space.
    pub fn to_pixel_space(self, dpi: f32) -> Rect {
        Rect {
            origin: self.origin,
            x0: to_pixels(self.x0, dpi),
            y0: to_pixels(self.y0, dpi),
            x1: to_pixels(self.x1, dpi),
            y1: to_pixels(self.y1, dpi),
        }
    }
}
