//! Grid layout planner
//!
//! Computes where each extracted illustration lands on the output canvas:
//! row-major cell rectangles inside the page margins, then an
//! aspect-preserving fit-and-center placement within the cell. Both
//! composition strategies share this module; all rectangles it produces are
//! in canvas point space with a bottom-left-up origin.

use crate::error::{SheetError, SheetResult};
use crate::geometry::{Origin, Rect};

/// Output canvas dimensions and grid configuration, fixed per deployment.
#[derive(Debug, Clone, Copy)]
pub struct CanvasSpec {
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    pub cols: usize,
    pub rows: usize,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl CanvasSpec {
    /// Number of grid slots on the sheet. Artifacts beyond this are dropped.
    pub fn capacity(&self) -> usize {
        self.cols * self.rows
    }

    /// Usable width inside the horizontal margins.
    pub fn available_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Usable height inside the vertical margins.
    pub fn available_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    pub fn cell_width(&self) -> f32 {
        self.available_width() / self.cols as f32
    }

    pub fn cell_height(&self) -> f32 {
        self.available_height() / self.rows as f32
    }

    /// Rectangle of the cell at `(row, col)`, bottom-left-up canvas space.
    ///
    /// Rows are counted from the top of the page: row 0 sits just under the
    /// top margin, so its bottom edge is `height - margin_top - cell_height`.
    pub fn cell_at(&self, row: usize, col: usize) -> Rect {
        let cell_w = self.cell_width();
        let cell_h = self.cell_height();
        let x = self.margin_left + col as f32 * cell_w;
        let y = self.height - self.margin_top - (row as f32 + 1.0) * cell_h;
        Rect::new(Origin::BottomLeftUp, x, y, x + cell_w, y + cell_h)
    }

    /// Rectangle of the cell for the zero-based artifact index, row-major.
    ///
    /// Returns `None` past `rows * cols`; dropping those artifacts is the
    /// truncation policy, not an error.
    pub fn cell_rect(&self, idx: usize) -> Option<Rect> {
        if idx >= self.capacity() {
            return None;
        }
        Some(self.cell_at(idx / self.cols, idx % self.cols))
    }
}

/// Fit an artifact of the given dimensions into `cell`, preserving aspect
/// ratio, and center it on both axes.
///
/// `scale_fix` is an empirically measured calibration multiplier applied to
/// the display size after fitting (default 1.0). Values above 1.0 may push
/// the placement slightly past the cell bounds; that overflow is intentional
/// fine tuning, so the fit guarantee only holds before calibration.
///
/// The artifact dimensions can be pixels or points; only their ratio matters.
pub fn fit_and_center(
    cell: Rect,
    artifact_width: f32,
    artifact_height: f32,
    scale_fix: f32,
) -> SheetResult<Rect> {
    if artifact_height <= 0.0 || artifact_width <= 0.0 {
        return Err(SheetError::InvalidArtifact(format!(
            "artifact dimensions {}x{} cannot be placed",
            artifact_width, artifact_height
        )));
    }

    let aspect = artifact_width / artifact_height;
    let cell_w = cell.width();
    let cell_h = cell.height();

    let (mut display_w, mut display_h) = if aspect > 1.0 {
        // Wider than tall: width-limited unless the cell is very flat
        let w = cell_w.min(cell_h * aspect);
        (w, w / aspect)
    } else {
        let h = cell_h.min(cell_w / aspect);
        (h * aspect, h)
    };

    display_w *= scale_fix;
    display_h *= scale_fix;

    let x = cell.x0 + (cell_w - display_w) / 2.0;
    let y = cell.y0 + (cell_h - display_h) / 2.0;

    Ok(Rect::new(cell.origin, x, y, x + display_w, y + display_h))
}

/// Center an artifact of known size in `cell` without scaling.
///
/// Translate-only placement for the vector strategy: the artifact keeps its
/// exact point dimensions, so it may overhang a smaller cell on an axis.
/// The visible region is still bounded by the artifact's own clip.
pub fn center_only(cell: Rect, artifact_width: f32, artifact_height: f32) -> Rect {
    let x = cell.x0 + (cell.width() - artifact_width) / 2.0;
    let y = cell.y0 + (cell.height() - artifact_height) / 2.0;
    Rect::new(cell.origin, x, y, x + artifact_width, y + artifact_height)
}
