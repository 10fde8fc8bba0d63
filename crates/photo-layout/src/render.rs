//! Page rendering
//!
//! The document writer is a seam: the pipeline talks to a [`DocumentWriter`]
//! and [`PdfWriter`] is the `printpdf` implementation used in production.

use crate::layout::{GridLayout, Page};
use crate::normalize::NormalizedImage;
use crate::types::{LayoutError, Result};
use image::imageops::FilterType;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// RGB8 pixel buffer sized for its cell at a given DPI
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
    /// Row-major RGB8 samples, `width * height * 3` bytes
    pub pixels: Vec<u8>,
}

/// Handle to a page created by a [`DocumentWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHandle(pub usize);

/// Output document collaborator.
///
/// Coordinates passed to `place_image` are PDF points with the origin at the
/// bottom-left corner of the page.
pub trait DocumentWriter {
    fn new_page(&mut self, width_pt: f32, height_pt: f32) -> PageHandle;

    fn place_image(
        &mut self,
        page: PageHandle,
        image: RasterImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()>;

    /// Write the finished document to `path`. Nothing is left at `path` on failure.
    fn save(self, path: &Path) -> Result<()>
    where
        Self: Sized;
}

// =============================================================================
// Rasterization
// =============================================================================

/// Pixels needed to cover `length_pt` at `dpi` (floored, at least one).
pub fn pixels_for(length_pt: f32, dpi: u32) -> u32 {
    ((length_pt / 72.0 * dpi as f32).floor() as u32).max(1)
}

/// Resample a normalized image to exactly fill one cell at `dpi`.
pub fn rasterize(image: &NormalizedImage, grid: &GridLayout, dpi: u32) -> RasterImage {
    let width = pixels_for(grid.cell_width_pt, dpi);
    let height = pixels_for(grid.cell_height_pt, dpi);
    let resized = image
        .image
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgb8();

    RasterImage {
        width,
        height,
        dpi,
        pixels: resized.into_raw(),
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Draw every placement and save the document to `output`.
///
/// `rasters` must be in placement order (image index 0, 1, 2, ...).
pub fn render_pages<W: DocumentWriter>(
    mut writer: W,
    pages: &[Page],
    rasters: Vec<RasterImage>,
    grid: &GridLayout,
    output: &Path,
) -> Result<()> {
    let mut rasters = rasters.into_iter();

    for page in pages {
        let handle = writer.new_page(grid.page_width_pt, grid.page_height_pt);
        for placement in &page.placements {
            let raster = rasters.next().ok_or(LayoutError::MissingRaster {
                index: placement.image_index,
            })?;
            let rect = placement.rect;
            writer.place_image(
                handle,
                raster,
                rect.x,
                rect.pdf_y(grid.page_height_pt),
                rect.width,
                rect.height,
            )?;
        }
    }

    writer.save(output)
}

/// Fail if an existing file at `path` may not be overwritten.
///
/// Renaming over a file only needs write access to its directory, so the
/// file's own permissions are checked first.
fn ensure_replaceable(path: &Path) -> std::io::Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if !metadata.is_file() {
        return Ok(());
    }
    if metadata.permissions().readonly() {
        return Err(std::io::Error::new(
            ErrorKind::PermissionDenied,
            "output file is read-only",
        ));
    }
    OpenOptions::new().write(true).open(path).map(|_| ())
}

/// Write `bytes` to a temporary file next to `path`, then rename it into place.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let render_error = |source: std::io::Error| LayoutError::Render {
        path: path.to_owned(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    ensure_replaceable(path).map_err(render_error)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".layout-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(render_error)?;
    temp.write_all(bytes).map_err(render_error)?;
    temp.as_file().sync_all().map_err(render_error)?;
    temp.persist(path).map_err(|e| render_error(e.error))?;
    Ok(())
}

// =============================================================================
// printpdf Writer
// =============================================================================

struct PendingPage {
    width_pt: f32,
    height_pt: f32,
    ops: Vec<Op>,
}

/// [`DocumentWriter`] producing a PDF with `printpdf`
pub struct PdfWriter {
    doc: PdfDocument,
    pages: Vec<PendingPage>,
}

impl PdfWriter {
    pub fn new(title: &str) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
        }
    }

    /// Serialize the document without touching the filesystem
    pub fn to_bytes(mut self) -> Vec<u8> {
        self.doc.pages = self
            .pages
            .into_iter()
            .map(|page| {
                PdfPage::new(
                    Mm::from(Pt(page.width_pt)),
                    Mm::from(Pt(page.height_pt)),
                    page.ops,
                )
            })
            .collect();

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        self.doc.save(&PdfSaveOptions::default(), &mut warnings)
    }
}

impl DocumentWriter for PdfWriter {
    fn new_page(&mut self, width_pt: f32, height_pt: f32) -> PageHandle {
        self.pages.push(PendingPage {
            width_pt,
            height_pt,
            ops: Vec::new(),
        });
        PageHandle(self.pages.len() - 1)
    }

    fn place_image(
        &mut self,
        page: PageHandle,
        image: RasterImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        let target = self
            .pages
            .get_mut(page.0)
            .ok_or(LayoutError::UnknownPage { page: page.0 })?;

        let dpi = image.dpi as f32;
        // Natural size of the image at its DPI, in points
        let natural_width = image.width as f32 * 72.0 / dpi;
        let natural_height = image.height as f32 * 72.0 / dpi;

        let raw = RawImage {
            pixels: RawImageData::U8(image.pixels),
            width: image.width as usize,
            height: image.height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let id = self.doc.add_image(&raw);

        target.ops.push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x)),
                translate_y: Some(Pt(y)),
                scale_x: Some(width / natural_width),
                scale_y: Some(height / natural_height),
                dpi: Some(dpi),
                rotate: None,
            },
        });
        Ok(())
    }

    fn save(self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes();
        write_atomically(path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{create_grid_layout, paginate};
    use crate::options::LayoutOptions;

    fn raster(dpi: u32) -> RasterImage {
        RasterImage {
            width: 4,
            height: 3,
            dpi,
            pixels: vec![128; 4 * 3 * 3],
        }
    }

    #[test]
    fn test_pixels_for() {
        // 4in at 600 dpi
        assert_eq!(pixels_for(288.0, 600), 2400);
        assert_eq!(pixels_for(216.0, 72), 216);
        assert_eq!(pixels_for(0.1, 1), 1);
    }

    #[test]
    fn test_rasterize_matches_cell() {
        let grid = create_grid_layout(&LayoutOptions::default()).unwrap();
        let normalized = NormalizedImage {
            path: "a.jpg".into(),
            image: image::DynamicImage::new_rgb8(40, 30),
            rotated: false,
            crop: crate::normalize::crop_rect(40, 30, 4.0 / 3.0),
        };

        let raster = rasterize(&normalized, &grid, 10);
        assert_eq!((raster.width, raster.height), (40, 30));
        assert_eq!(raster.pixels.len(), 40 * 30 * 3);
    }

    #[test]
    fn test_unknown_page_handle() {
        let mut writer = PdfWriter::new("test");
        let result = writer.place_image(PageHandle(3), raster(72), 0.0, 0.0, 4.0, 3.0);
        assert!(matches!(result, Err(LayoutError::UnknownPage { page: 3 })));
    }

    #[test]
    fn test_pdf_page_count() {
        let grid = create_grid_layout(&LayoutOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");

        let pages = paginate(7, &grid);
        let rasters = (0..7).map(|_| raster(72)).collect();
        render_pages(PdfWriter::new("test"), &pages, rasters, &grid, &output).unwrap();

        let doc = lopdf::Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_missing_raster_is_an_error() {
        let grid = create_grid_layout(&LayoutOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");

        let pages = paginate(2, &grid);
        let result = render_pages(PdfWriter::new("test"), &pages, vec![raster(72)], &grid, &output);
        assert!(matches!(result, Err(LayoutError::MissingRaster { index: 1 })));
        assert!(!output.exists());
    }

    #[test]
    fn test_atomic_write_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("out.pdf");

        match write_atomically(&output, b"%PDF") {
            Err(LayoutError::Render { path, .. }) => assert_eq!(path, output),
            other => panic!("Expected Render error, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        std::fs::write(&output, b"old").unwrap();

        write_atomically(&output, b"new").unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"new");
        // Only the output remains, no stray temp files
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_atomic_write_keeps_read_only_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        std::fs::write(&output, b"PROTECTED").unwrap();
        let mut permissions = std::fs::metadata(&output).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&output, permissions).unwrap();

        match write_atomically(&output, b"%PDF") {
            Err(LayoutError::Render { path, source }) => {
                assert_eq!(path, output);
                assert_eq!(source.kind(), ErrorKind::PermissionDenied);
            }
            other => panic!("Expected Render error, got {:?}", other),
        }
        assert_eq!(std::fs::read(&output).unwrap(), b"PROTECTED");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
