//! Shared constants for photo layout
//!
//! Unit conversions and the default values used when an option is not given.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert inches to points
#[inline]
pub fn in_to_pt(inches: f32) -> f32 {
    inches * POINTS_PER_INCH
}

// =============================================================================
// Layout Defaults
// =============================================================================

/// Default cell width in inches
pub const DEFAULT_CELL_WIDTH_IN: f32 = 4.0;

/// Default cell height in inches
pub const DEFAULT_CELL_HEIGHT_IN: f32 = 3.0;

/// Default page margin (and inter-cell spacing) in inches
pub const DEFAULT_MARGIN_IN: f32 = 0.125;

pub const DEFAULT_COLS: usize = 2;

pub const DEFAULT_ROWS: usize = 3;

/// Default rasterization density for embedded images
pub const DEFAULT_DPI: u32 = 600;

pub const DEFAULT_OUTPUT: &str = "layout.pdf";

/// Largest raster allowed for one cell, in pixels (about 300 MB as RGB8)
pub const MAX_RASTER_PIXELS: f64 = 100_000_000.0;

// =============================================================================
// Image Handling
// =============================================================================

/// File extensions (lowercase) picked up by discovery
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Slack allowed when comparing page geometry in points
pub const GEOMETRY_EPSILON: f32 = 1e-3;

/// Nudge applied before flooring crop sizes, so products like
/// 3000 × 4/3 = 3999.9999… still land on 4000 pixels
pub const CROP_ROUNDING_EPSILON: f64 = 1e-6;
