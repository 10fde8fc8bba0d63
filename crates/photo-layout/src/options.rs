use crate::constants::*;
use crate::layout::{GridLayout, create_grid_layout};
use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Photo layout configuration as supplied by the user
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutOptions {
    // Input
    pub input_dir: PathBuf,

    // Cell footprint (inches)
    pub cell_width_in: f32,
    pub cell_height_in: f32,

    // Page border and gap between cells (inches); spacing defaults to the margin
    pub margin_in: f32,
    pub spacing_in: Option<f32>,

    // Grid shape
    pub rows: usize,
    pub cols: usize,

    // Output
    pub dpi: u32,
    pub page_size: PageSize,
    pub output_path: PathBuf,

    // Orientation every image is turned into before cropping
    pub target_orientation: Orientation,

    // Concurrent decode workers (0 = available parallelism)
    pub jobs: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            cell_width_in: DEFAULT_CELL_WIDTH_IN,
            cell_height_in: DEFAULT_CELL_HEIGHT_IN,
            margin_in: DEFAULT_MARGIN_IN,
            spacing_in: None,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            dpi: DEFAULT_DPI,
            page_size: PageSize::Letter,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            target_orientation: Orientation::Landscape,
            jobs: 0,
        }
    }
}

impl LayoutOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| LayoutError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Gap between neighbouring cells in inches
    pub fn spacing(&self) -> f32 {
        self.spacing_in.unwrap_or(self.margin_in)
    }

    /// Target aspect ratio (cell width / cell height)
    pub fn aspect_ratio(&self) -> f64 {
        self.cell_width_in as f64 / self.cell_height_in as f64
    }

    /// Number of decode workers to run
    pub fn worker_count(&self) -> usize {
        if self.jobs > 0 {
            self.jobs
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }

    /// Validate the options against the page geometry
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(LayoutError::LayoutInfeasible(
                "DPI must be at least 1".to_string(),
            ));
        }
        create_grid_layout(self)?;

        let width_px = (self.cell_width_in as f64 * self.dpi as f64).floor();
        let height_px = (self.cell_height_in as f64 * self.dpi as f64).floor();
        if width_px * height_px > MAX_RASTER_PIXELS {
            return Err(LayoutError::LayoutInfeasible(format!(
                "{} DPI needs a {}x{} pixel raster per cell, more than {} pixels",
                self.dpi, width_px, height_px, MAX_RASTER_PIXELS
            )));
        }
        Ok(())
    }
}

/// Validated, immutable layout configuration.
///
/// Construction fails with [`LayoutError::LayoutInfeasible`] if the grid does
/// not fit the page, so a `LayoutConfig` always describes a renderable layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    options: LayoutOptions,
    grid: GridLayout,
}

impl LayoutConfig {
    pub fn new(options: LayoutOptions) -> Result<Self> {
        options.validate()?;
        let grid = create_grid_layout(&options)?;
        Ok(Self { options, grid })
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }
}
