//! Image normalization
//!
//! Turns a decoded source image into one that matches the cell aspect ratio:
//! first rotate it into the target orientation, then crop the largest centered
//! rectangle of the target ratio out of it.

use crate::constants::CROP_ROUNDING_EPSILON;
use crate::types::{LayoutError, Orientation, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// A decoded image, owned only while it is being normalized
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub image: DynamicImage,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self {
            path: path.into(),
            width: image.width(),
            height: image.height(),
            image,
        }
    }
}

/// Decodes image files into pixel buffers.
pub trait SourceDecoder: Send + Sync {
    /// Fails with [`LayoutError::UnreadableImage`] when the file cannot be parsed.
    fn decode(&self, path: &Path) -> Result<SourceImage>;
}

/// Decoder backed by the `image` crate (format guessed from file contents)
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl SourceDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<SourceImage> {
        let unreadable = |reason: String| LayoutError::UnreadableImage {
            path: path.to_owned(),
            reason,
        };
        let image = image::ImageReader::open(path)
            .map_err(|e| unreadable(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| unreadable(e.to_string()))?
            .decode()
            .map_err(|e| unreadable(e.to_string()))?;
        Ok(SourceImage::new(path, image))
    }
}

/// Crop rectangle in source pixels, kept in floating point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Whole-pixel rectangle (x, y, width, height): sizes are floored, then
    /// the leftover is split evenly with the extra pixel going right/bottom.
    pub fn to_pixels(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let w = ((self.width + CROP_ROUNDING_EPSILON).floor() as u32).clamp(1, width.max(1));
        let h = ((self.height + CROP_ROUNDING_EPSILON).floor() as u32).clamp(1, height.max(1));
        ((width - w) / 2, (height - h) / 2, w, h)
    }

    pub fn is_identity(&self, width: u32, height: u32) -> bool {
        self.to_pixels(width, height) == (0, 0, width, height)
    }
}

/// An image rotated and cropped to the cell aspect ratio
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub path: PathBuf,
    pub image: DynamicImage,
    /// Whether a 90° rotation was applied
    pub rotated: bool,
    /// Crop applied to the (possibly rotated) source
    pub crop: CropRect,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Whether an image of the given size must be turned to reach `target`.
pub fn needs_rotation(width: u32, height: u32, target: Orientation) -> bool {
    width != height && Orientation::of(width, height) != target
}

/// Largest centered rectangle with `target_ratio` (width / height) inside a
/// `width` x `height` image. A matching ratio returns the whole image.
pub fn crop_rect(width: u32, height: u32, target_ratio: f64) -> CropRect {
    let (w, h) = (width as f64, height as f64);
    let current_ratio = w / h;

    if current_ratio > target_ratio {
        // Too wide: trim left and right
        let new_width = h * target_ratio;
        CropRect {
            x: (w - new_width) / 2.0,
            y: 0.0,
            width: new_width,
            height: h,
        }
    } else if current_ratio < target_ratio {
        // Too tall: trim top and bottom
        let new_height = w / target_ratio;
        CropRect {
            x: 0.0,
            y: (h - new_height) / 2.0,
            width: w,
            height: new_height,
        }
    } else {
        CropRect {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
        }
    }
}

/// Rotate `source` into `target` orientation and crop it to `target_ratio`.
pub fn normalize(
    source: SourceImage,
    target_ratio: f64,
    target: Orientation,
) -> NormalizedImage {
    let rotated = needs_rotation(source.width, source.height, target);
    let image = if rotated {
        // Quarter turn counter-clockwise
        source.image.rotate270()
    } else {
        source.image
    };

    let (width, height) = (image.width(), image.height());
    let crop = crop_rect(width, height, target_ratio);
    let image = if crop.is_identity(width, height) {
        image
    } else {
        let (x, y, w, h) = crop.to_pixels(width, height);
        image.crop_imm(x, y, w, h)
    };

    NormalizedImage {
        path: source.path,
        image,
        rotated,
        crop,
    }
}
