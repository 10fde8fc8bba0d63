use crate::types::Result;
use image::DynamicImage;
use std::path::Path;

/// Decodes HEIC files into pixel buffers.
pub trait HeicDecoder: Send + Sync {
    /// Fails with [`ConvertError::Decode`](crate::ConvertError::Decode) when
    /// the file cannot be parsed.
    fn decode(&self, path: &Path) -> Result<DynamicImage>;
}

/// Decoder backed by libheif, reading the primary image as interleaved RGB
#[cfg(feature = "libheif")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LibHeifDecoder;

#[cfg(feature = "libheif")]
impl HeicDecoder for LibHeifDecoder {
    fn decode(&self, path: &Path) -> Result<DynamicImage> {
        use crate::types::ConvertError;
        use image::RgbImage;
        use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

        let failed = |reason: String| ConvertError::Decode {
            path: path.to_owned(),
            reason,
        };
        let name = path
            .to_str()
            .ok_or_else(|| failed("path is not valid UTF-8".to_string()))?;

        let context = HeifContext::read_from_file(name).map_err(|e| failed(e.to_string()))?;
        let handle = context
            .primary_image_handle()
            .map_err(|e| failed(e.to_string()))?;
        let decoded = LibHeif::new()
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(|e| failed(e.to_string()))?;

        let plane = decoded
            .planes()
            .interleaved
            .ok_or_else(|| failed("no interleaved RGB plane".to_string()))?;
        let row_len = plane.width as usize * 3;

        // Rows are padded to `stride` bytes
        let mut pixels = Vec::with_capacity(row_len * plane.height as usize);
        for row in plane.data.chunks(plane.stride).take(plane.height as usize) {
            let row = row
                .get(..row_len)
                .ok_or_else(|| failed("truncated pixel row".to_string()))?;
            pixels.extend_from_slice(row);
        }

        RgbImage::from_raw(plane.width, plane.height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| failed("pixel buffer does not match image size".to_string()))
    }
}
