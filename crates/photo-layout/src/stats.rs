use crate::layout::{GridLayout, page_count};
use crate::types::*;

/// Calculate statistics for laying out `image_count` images on `grid`
pub fn calculate_statistics(image_count: usize, grid: &GridLayout) -> LayoutStatistics {
    let cells_per_page = grid.cell_count();
    let pages = page_count(image_count, grid);

    LayoutStatistics {
        images: image_count,
        cells_per_page,
        pages,
        empty_cells: pages * cells_per_page - image_count,
    }
}
