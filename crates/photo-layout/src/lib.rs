pub mod constants;
mod discovery;
pub mod layout;
pub mod normalize;
mod options;
mod pipeline;
pub mod render;
mod stats;
mod types;

pub use discovery::{ImageSet, discover_images, is_supported_image};
pub use normalize::{ImageCrateDecoder, NormalizedImage, SourceDecoder, SourceImage};
pub use options::*;
pub use pipeline::{LayoutSummary, SkippedImage, generate_layout, generate_layout_with};
pub use render::{DocumentWriter, PdfWriter, RasterImage};
pub use stats::calculate_statistics;
pub use types::*;
