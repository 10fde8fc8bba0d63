use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },
    #[error("Layout infeasible: {0}")]
    LayoutInfeasible(String),
    #[error("Unreadable image {}: {reason}", path.display())]
    UnreadableImage { path: PathBuf, reason: String },
    #[error("Failed to write {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No image data for placement {index}")]
    MissingRaster { index: usize },
    #[error("Unknown page handle {page}")]
    UnknownPage { page: usize },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Image orientation, decided purely by comparing width and height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Width >= height (square images count as landscape)
    #[default]
    Landscape,
    /// Height > width
    Portrait,
}

impl Orientation {
    pub fn of(width: u32, height: u32) -> Self {
        if width < height {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// Supported output page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageSize {
    #[default]
    Letter,
    A4,
    Legal,
}

/// Page size table: (size, name, (width_pt, height_pt)), portrait orientation
pub const PAGE_SIZES: [(PageSize, &str, (f32, f32)); 3] = [
    (PageSize::Letter, "letter", (612.0, 792.0)),
    (PageSize::A4, "A4", (595.2756, 841.8898)),
    (PageSize::Legal, "legal", (612.0, 1008.0)),
];

impl PageSize {
    fn entry(self) -> &'static (PageSize, &'static str, (f32, f32)) {
        // Every variant has exactly one row in the table
        PAGE_SIZES
            .iter()
            .find(|(size, _, _)| *size == self)
            .unwrap_or(&PAGE_SIZES[0])
    }

    /// Page dimensions in points (width, height)
    pub fn dimensions_pt(self) -> (f32, f32) {
        self.entry().2
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }
}

impl std::str::FromStr for PageSize {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        PAGE_SIZES
            .iter()
            .find(|(_, name, _)| name.eq_ignore_ascii_case(s))
            .map(|(size, _, _)| *size)
            .ok_or_else(|| {
                LayoutError::Config(format!(
                    "Invalid page size: {}. Choose from: letter, A4, legal",
                    s
                ))
            })
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Statistics about a planned layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStatistics {
    /// Number of images discovered
    pub images: usize,
    /// Cells available on each page (rows × cols)
    pub cells_per_page: usize,
    /// Number of output pages
    pub pages: usize,
    /// Unused cells on the last page
    pub empty_cells: usize,
}
