//! Layout calculation for photo pages
//!
//! This module handles the geometry of a photo sheet:
//! - Grid construction and feasibility checks against the page size
//! - Row-major assignment of images to cells across pages

mod grid;
mod types;

pub use grid::*;
pub use types::*;
