use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use photo_layout::{LayoutConfig, LayoutOptions, Orientation, PageSize};
use photo_tools_cli::logger::ConsoleLogger;
use std::path::PathBuf;

/// Generate a PDF layout from the images in a directory
#[derive(Parser)]
#[command(name = "layout", version)]
struct Cli {
    /// Directory containing input images (default: current directory)
    #[arg(short = 'd', long)]
    input_dir: Option<PathBuf>,

    /// Image width in inches (default: 4.0)
    #[arg(short, long)]
    width: Option<f32>,

    /// Image height in inches (default: 3.0)
    #[arg(long)]
    height: Option<f32>,

    /// Page margin in inches (default: 0.125)
    #[arg(short, long)]
    margin: Option<f32>,

    /// Gap between images in inches (default: same as margin)
    #[arg(long)]
    spacing: Option<f32>,

    /// Number of columns (default: 2)
    #[arg(short, long)]
    cols: Option<usize>,

    /// Number of rows (default: 3)
    #[arg(short, long)]
    rows: Option<usize>,

    /// DPI resolution for embedded images (default: 600)
    #[arg(long)]
    dpi: Option<u32>,

    /// Page size (default: letter)
    #[arg(short, long, value_enum)]
    page_size: Option<PageArg>,

    /// Orientation images are turned to before cropping (default: landscape)
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Output PDF filename (default: layout.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Concurrent image decoders (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Load options from a JSON file; flags given on the command line win
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective options to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Show statistics only, don't generate PDF
    #[arg(long)]
    stats_only: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PageArg {
    Letter,
    #[value(name = "A4", alias = "a4")]
    A4,
    Legal,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Landscape,
    Portrait,
}

impl From<PageArg> for PageSize {
    fn from(arg: PageArg) -> Self {
        match arg {
            PageArg::Letter => Self::Letter,
            PageArg::A4 => Self::A4,
            PageArg::Legal => Self::Legal,
        }
    }
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Landscape => Self::Landscape,
            OrientationArg::Portrait => Self::Portrait,
        }
    }
}

impl Cli {
    /// Apply the flags that were given on top of `options`
    fn apply(&self, mut options: LayoutOptions) -> LayoutOptions {
        if let Some(dir) = &self.input_dir {
            options.input_dir = dir.clone();
        }
        if let Some(width) = self.width {
            options.cell_width_in = width;
        }
        if let Some(height) = self.height {
            options.cell_height_in = height;
        }
        if let Some(margin) = self.margin {
            options.margin_in = margin;
        }
        if self.spacing.is_some() {
            options.spacing_in = self.spacing;
        }
        if let Some(cols) = self.cols {
            options.cols = cols;
        }
        if let Some(rows) = self.rows {
            options.rows = rows;
        }
        if let Some(dpi) = self.dpi {
            options.dpi = dpi;
        }
        if let Some(page_size) = self.page_size {
            options.page_size = page_size.into();
        }
        if let Some(orientation) = self.orientation {
            options.target_orientation = orientation.into();
        }
        if let Some(output) = &self.output {
            options.output_path = output.clone();
        }
        if let Some(jobs) = self.jobs {
            options.jobs = jobs;
        }
        options
    }
}

/// Merge flags over the base options and validate them.
///
/// `--save-config` only writes options that passed validation.
async fn build_config(cli: &Cli) -> Result<LayoutConfig> {
    let base = match &cli.config {
        Some(path) => LayoutOptions::load(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => LayoutOptions::default(),
    };
    let config = LayoutConfig::new(cli.apply(base))?;

    if let Some(path) = &cli.save_config {
        config.options().save(path).await?;
        println!("Saved options → {}", path.display());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ConsoleLogger::new(cli.verbose).init()?;

    let config = build_config(&cli).await?;

    if cli.stats_only {
        let images = photo_layout::discover_images(&config.options().input_dir).await?;
        let stats = photo_layout::calculate_statistics(images.len(), config.grid());
        println!("Layout Statistics:");
        println!("  Images: {}", stats.images);
        println!("  Cells per page: {}", stats.cells_per_page);
        println!("  Pages: {}", stats.pages);
        println!("  Empty cells: {}", stats.empty_cells);
        return Ok(());
    }

    let summary = photo_layout::generate_layout(&config).await?;
    match &summary.output {
        Some(path) => println!(
            "Generated {} page(s) with {} image(s), {} skipped → {}",
            summary.pages,
            summary.images_placed,
            summary.skipped.len(),
            path.display()
        ),
        None if summary.images_found == 0 => println!(
            "No images found in {}",
            config.options().input_dir.display()
        ),
        None => println!(
            "Generated 0 pages, {} skipped; no document written",
            summary.skipped.len()
        ),
    }

    Ok(())
}
