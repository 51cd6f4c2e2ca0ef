//! Configuration management for Vignette Server
//!
//! All layout constants are deployment configuration: they are loaded once at
//! startup, never derived per document and never settable per request. The
//! defaults are the measured reference deployment (crop box tuned against one
//! known layout at 612x792).

use serde::Deserialize;
use std::env;

use crate::geometry::{Origin, Rect};
use crate::layout::CanvasSpec;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub sheet: SheetConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which extraction/composition strategy the deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Rasterize page 1 and crop pixels; output embeds images.
    Raster,
    /// Crop in point space without resampling; output merges page content.
    Vector,
}

/// Fixed constants of the sheet pipeline.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    /// Illustration region on page 1, measured in document points with a
    /// top-left-down origin (how the constant was measured).
    pub crop_box: Rect,
    /// Output canvas and grid geometry.
    pub canvas: CanvasSpec,
    /// Rasterization resolution for the raster strategy.
    pub dpi: u32,
    /// Measured calibration multiplier for displayed artifact size.
    pub scale_fix: f32,
    pub strategy: Strategy,
    /// Per-document decode/rasterize budget; exceeding it fails that
    /// document rather than hanging the batch.
    pub decode_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            sheet: SheetConfig {
                crop_box: Rect::new(Origin::TopLeftDown, 55.0, 52.0, 160.0, 339.0),
                canvas: CanvasSpec {
                    width: 612.0,
                    height: 792.0,
                    cols: 5,
                    rows: 2,
                    margin_left: 55.0,
                    margin_right: 55.0,
                    margin_top: 52.0,
                    margin_bottom: 52.0,
                },
                dpi: 300,
                scale_fix: 1.04,
                strategy: Strategy::Raster,
                decode_timeout_secs: 30,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            sheet: SheetConfig {
                crop_box: env::var("SHEET_CROP_BOX")
                    .ok()
                    .and_then(|v| parse_crop_box(&v))
                    .unwrap_or(defaults.sheet.crop_box),
                canvas: CanvasSpec {
                    width: env_f32("SHEET_PAGE_WIDTH", defaults.sheet.canvas.width),
                    height: env_f32("SHEET_PAGE_HEIGHT", defaults.sheet.canvas.height),
                    cols: env_usize("SHEET_GRID_COLS", defaults.sheet.canvas.cols),
                    rows: env_usize("SHEET_GRID_ROWS", defaults.sheet.canvas.rows),
                    margin_left: env_f32("SHEET_MARGIN_LEFT", defaults.sheet.canvas.margin_left),
                    margin_right: env_f32("SHEET_MARGIN_RIGHT", defaults.sheet.canvas.margin_right),
                    margin_top: env_f32("SHEET_MARGIN_TOP", defaults.sheet.canvas.margin_top),
                    margin_bottom: env_f32(
                        "SHEET_MARGIN_BOTTOM",
                        defaults.sheet.canvas.margin_bottom,
                    ),
                },
                dpi: env::var("SHEET_DPI")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.sheet.dpi),
                scale_fix: env_f32("SHEET_SCALE_FIX", defaults.sheet.scale_fix),
                strategy: match env::var("SHEET_STRATEGY").as_deref() {
                    Ok("vector") => Strategy::Vector,
                    Ok("raster") => Strategy::Raster,
                    _ => defaults.sheet.strategy,
                },
                decode_timeout_secs: env::var("SHEET_DECODE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.sheet.decode_timeout_secs),
            },
        }
    }
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse "x0,y0,x1,y1" into the top-left-down crop rectangle.
fn parse_crop_box(value: &str) -> Option<Rect> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() != 4 || parts[2] <= parts[0] || parts[3] <= parts[1] {
        return None;
    }
    Some(Rect::new(
        Origin::TopLeftDown,
        parts[0],
        parts[1],
        parts[2],
        parts[3],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = Config::default();
        assert_eq!(config.sheet.crop_box.x0, 55.0);
        assert_eq!(config.sheet.crop_box.y1, 339.0);
        assert_eq!(config.sheet.crop_box.origin, Origin::TopLeftDown);
        assert_eq!(config.sheet.canvas.cols, 5);
        assert_eq!(config.sheet.canvas.rows, 2);
        assert_eq!(config.sheet.dpi, 300);
        assert_eq!(config.sheet.strategy, Strategy::Raster);
    }

    #[test]
    fn test_parse_crop_box() {
        let rect = parse_crop_box("55, 52, 160, 339").unwrap();
        assert_eq!(rect.x1, 160.0);
        assert_eq!(rect.origin, Origin::TopLeftDown);

        assert!(parse_crop_box("55,52,160").is_none());
        assert!(parse_crop_box("160,52,55,339").is_none());
        assert!(parse_crop_box("not,a,crop,box").is_none());
    }
}
