//! Grid layout calculation
//!
//! This module builds the cell grid for a page and assigns images to cells
//! in row-major order, spilling onto new pages once a page is full.

use crate::constants::{GEOMETRY_EPSILON, in_to_pt};
use crate::options::LayoutOptions;
use crate::types::{LayoutError, Result};

use super::{GridLayout, GridPosition, Page, Placement, Rect};

// =============================================================================
// Grid Creation
// =============================================================================

/// Create the grid layout described by `options`.
///
/// Fails with [`LayoutError::LayoutInfeasible`] when the grid shape is empty,
/// a dimension is not positive, or the cells plus margins and spacing do not
/// fit on the page.
pub fn create_grid_layout(options: &LayoutOptions) -> Result<GridLayout> {
    if options.rows == 0 || options.cols == 0 {
        return Err(LayoutError::LayoutInfeasible(format!(
            "Grid must have at least one row and one column (got {} x {})",
            options.rows, options.cols
        )));
    }
    if !(options.cell_width_in > 0.0) || !(options.cell_height_in > 0.0) {
        return Err(LayoutError::LayoutInfeasible(format!(
            "Cell dimensions must be positive (got {} x {} in)",
            options.cell_width_in, options.cell_height_in
        )));
    }
    if !(options.margin_in >= 0.0) || !(options.spacing() >= 0.0) {
        return Err(LayoutError::LayoutInfeasible(
            "Margin and spacing must not be negative".to_string(),
        ));
    }

    let (page_width_pt, page_height_pt) = options.page_size.dimensions_pt();
    let grid = GridLayout {
        rows: options.rows,
        cols: options.cols,
        page_width_pt,
        page_height_pt,
        margin_pt: in_to_pt(options.margin_in),
        spacing_pt: in_to_pt(options.spacing()),
        cell_width_pt: in_to_pt(options.cell_width_in),
        cell_height_pt: in_to_pt(options.cell_height_in),
    };

    let used_width = grid.used_width_pt();
    let used_height = grid.used_height_pt();
    if used_width > page_width_pt + GEOMETRY_EPSILON
        || used_height > page_height_pt + GEOMETRY_EPSILON
    {
        return Err(LayoutError::LayoutInfeasible(format!(
            "{} x {} grid needs {:.1} x {:.1} pt but a {} page is {:.1} x {:.1} pt",
            grid.rows,
            grid.cols,
            used_width,
            used_height,
            options.page_size,
            page_width_pt,
            page_height_pt
        )));
    }

    Ok(grid)
}

// =============================================================================
// Placement
// =============================================================================

/// Page index and cell for the image at `index` (row-major, zero-based).
pub fn grid_position(index: usize, grid: &GridLayout) -> (usize, GridPosition) {
    let per_page = grid.cell_count();
    let cell = index % per_page;
    (index / per_page, GridPosition::new(cell / grid.cols, cell % grid.cols))
}

/// Bounds of the cell at `pos`, measured from the top-left page corner.
pub fn cell_bounds(grid: &GridLayout, pos: GridPosition) -> Rect {
    let x = grid.margin_pt + pos.col as f32 * (grid.cell_width_pt + grid.spacing_pt);
    let y = grid.margin_pt + pos.row as f32 * (grid.cell_height_pt + grid.spacing_pt);
    Rect::new(x, y, grid.cell_width_pt, grid.cell_height_pt)
}

/// Placement of the image at `index`. The image fills its cell exactly.
pub fn place(index: usize, grid: &GridLayout) -> Placement {
    let (page_index, position) = grid_position(index, grid);
    Placement {
        image_index: index,
        page_index,
        position,
        rect: cell_bounds(grid, position),
    }
}

/// Number of pages needed for `image_count` images.
pub fn page_count(image_count: usize, grid: &GridLayout) -> usize {
    image_count.div_ceil(grid.cell_count())
}

/// Lay out `image_count` images, one `Page` per filled grid.
pub fn paginate(image_count: usize, grid: &GridLayout) -> Vec<Page> {
    let per_page = grid.cell_count();
    (0..page_count(image_count, grid))
        .map(|index| {
            let start = index * per_page;
            let end = (start + per_page).min(image_count);
            Page {
                index,
                placements: (start..end).map(|i| place(i, grid)).collect(),
            }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
