//! Layout data types
//!
//! These types sit between image normalization and PDF rendering. All
//! measurements are in points; offsets are measured from the top-left corner
//! of the page.

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Grid of equally sized cells on a page
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLayout {
    /// Number of rows per page
    pub rows: usize,
    /// Number of columns per page
    pub cols: usize,
    /// Page width in points
    pub page_width_pt: f32,
    /// Page height in points
    pub page_height_pt: f32,
    /// Border between the page edge and the outer cells
    pub margin_pt: f32,
    /// Gap between neighbouring cells
    pub spacing_pt: f32,
    /// Width of each cell in points
    pub cell_width_pt: f32,
    /// Height of each cell in points
    pub cell_height_pt: f32,
}

impl GridLayout {
    /// Total number of cells on one page
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Width used by the grid including both side margins
    pub fn used_width_pt(&self) -> f32 {
        used_extent(self.cols, self.cell_width_pt, self.margin_pt, self.spacing_pt)
    }

    /// Height used by the grid including top and bottom margins
    pub fn used_height_pt(&self) -> f32 {
        used_extent(self.rows, self.cell_height_pt, self.margin_pt, self.spacing_pt)
    }
}

pub(crate) fn used_extent(count: usize, cell: f32, margin: f32, spacing: f32) -> f32 {
    2.0 * margin + count as f32 * cell + count.saturating_sub(1) as f32 * spacing
}

/// A rectangular area in points, origin at the top-left of the page
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Distance from the left page edge
    pub x: f32,
    /// Distance from the top page edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Y of the lower edge in PDF coordinates (origin bottom-left)
    pub fn pdf_y(&self, page_height_pt: f32) -> f32 {
        page_height_pt - self.y - self.height
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Where one image lands in the output document
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    /// Index into the ordered list of placed images
    pub image_index: usize,
    /// Zero-based output page
    pub page_index: usize,
    /// Cell on that page
    pub position: GridPosition,
    /// Offsets and rendered size of the image
    pub rect: Rect,
}

/// One output page and the placements bound to it, in cell order
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: usize,
    pub placements: Vec<Placement>,
}
