//! Photo layout pipeline
//!
//! This module orchestrates one layout run:
//! 1. Discover images in the input directory
//! 2. Decode, normalize and rasterize them on a bounded set of workers
//! 3. Assign placements in discovery order
//! 4. Render and atomically write the output document

use crate::discovery::{ImageSet, discover_images};
use crate::layout::{GridLayout, paginate};
use crate::normalize::{ImageCrateDecoder, SourceDecoder, normalize};
use crate::options::LayoutConfig;
use crate::render::{DocumentWriter, PdfWriter, RasterImage, rasterize, render_pages};
use crate::types::{LayoutError, Orientation, Result};
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const DOCUMENT_TITLE: &str = "Photo Layout";

/// An image left out of the document because it could not be decoded
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a layout run
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSummary {
    /// Images found by discovery
    pub images_found: usize,
    /// Images placed in the document
    pub images_placed: usize,
    /// Images skipped because they could not be read
    pub skipped: Vec<SkippedImage>,
    /// Pages in the output document
    pub pages: usize,
    /// Written document, `None` when nothing was placed
    pub output: Option<PathBuf>,
}

/// Run the layout with the default decoder and the PDF writer.
pub async fn generate_layout(config: &LayoutConfig) -> Result<LayoutSummary> {
    generate_layout_with(config, Arc::new(ImageCrateDecoder), || {
        PdfWriter::new(DOCUMENT_TITLE)
    })
    .await
}

/// Run the layout with a caller-supplied decoder and document writer.
///
/// `make_writer` runs on the blocking render thread, and only once at least
/// one image has been placed.
pub async fn generate_layout_with<F, W>(
    config: &LayoutConfig,
    decoder: Arc<dyn SourceDecoder>,
    make_writer: F,
) -> Result<LayoutSummary>
where
    F: FnOnce() -> W + Send + 'static,
    W: DocumentWriter,
{
    let options = config.options();
    let grid = config.grid();

    let images = discover_images(&options.input_dir).await?;
    if images.is_empty() {
        log::info!("No images found in {}", options.input_dir.display());
        return Ok(LayoutSummary {
            images_found: 0,
            images_placed: 0,
            skipped: Vec::new(),
            pages: 0,
            output: None,
        });
    }

    log::info!("Found {} images", images.len());
    log::info!(
        "Creating {}x{} grid on {} page",
        grid.rows,
        grid.cols,
        options.page_size
    );
    log::info!(
        "Image size: {}\" x {}\" at {} DPI",
        options.cell_width_in,
        options.cell_height_in,
        options.dpi
    );

    let params = PrepareParams {
        ratio: options.aspect_ratio(),
        orientation: options.target_orientation,
        grid: grid.clone(),
        dpi: options.dpi,
    };
    let prepared = prepare_images(&images, params, decoder, options.worker_count()).await?;

    let mut rasters = Vec::with_capacity(prepared.len());
    let mut placed_paths = Vec::with_capacity(prepared.len());
    let mut skipped = Vec::new();
    for (path, outcome) in prepared {
        match outcome {
            Ok(raster) => {
                rasters.push(raster);
                placed_paths.push(path);
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                skipped.push(SkippedImage {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    let pages = paginate(rasters.len(), grid);
    for page in &pages {
        for placement in &page.placements {
            log::info!(
                "  Placing {} @ row {}, col {} on page {}",
                display_name(&placed_paths[placement.image_index]),
                placement.position.row,
                placement.position.col,
                page.index + 1
            );
        }
    }

    let summary = LayoutSummary {
        images_found: images.len(),
        images_placed: rasters.len(),
        skipped,
        pages: pages.len(),
        output: (!pages.is_empty()).then(|| options.output_path.clone()),
    };
    if pages.is_empty() {
        log::warn!("None of the images could be read; no document written");
        return Ok(summary);
    }

    let output = options.output_path.clone();
    let grid = grid.clone();
    tokio::task::spawn_blocking(move || {
        render_pages(make_writer(), &pages, rasters, &grid, &output)
    })
    .await??;

    log::info!("PDF saved as: {}", options.output_path.display());
    Ok(summary)
}

/// Per-image work parameters shared by all workers
#[derive(Debug, Clone)]
struct PrepareParams {
    ratio: f64,
    orientation: Orientation,
    grid: GridLayout,
    dpi: u32,
}

fn prepare_image(
    decoder: &dyn SourceDecoder,
    path: &Path,
    params: &PrepareParams,
) -> Result<RasterImage> {
    let source = decoder.decode(path)?;
    let normalized = normalize(source, params.ratio, params.orientation);
    Ok(rasterize(&normalized, &params.grid, params.dpi))
}

/// Decode and rasterize every image with at most `workers` running at once.
///
/// Workers finish in any order; results come back in discovery order.
async fn prepare_images(
    images: &ImageSet,
    params: PrepareParams,
    decoder: Arc<dyn SourceDecoder>,
    workers: usize,
) -> Result<Vec<(PathBuf, Result<RasterImage>)>> {
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let params = Arc::new(params);
    let mut tasks = JoinSet::new();

    for (index, path) in images.iter().cloned().enumerate() {
        let permits = Arc::clone(&permits);
        let decoder = Arc::clone(&decoder);
        let params = Arc::clone(&params);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let job_path = path.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                prepare_image(decoder.as_ref(), &job_path, &params)
            })
            .await;
            (index, path, outcome)
        });
    }

    let mut slots: Vec<Option<(PathBuf, Result<RasterImage>)>> =
        (0..images.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, path, outcome) = joined?;
        let outcome = match outcome {
            Ok(result) => result,
            // A panicking codec only loses its own image
            Err(e) if e.is_panic() => Err(LayoutError::UnreadableImage {
                path: path.clone(),
                reason: panic_reason(e.into_panic()),
            }),
            Err(e) => return Err(e.into()),
        };
        slots[index] = Some((path, outcome));
    }

    Ok(slots.into_iter().flatten().collect())
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("decoder panicked: {}", message)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
