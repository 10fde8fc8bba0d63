//! Convert HEIC photos in a directory to JPEG, PNG or WebP

mod convert;
mod decode;
mod types;

pub use convert::{
    ConversionSummary, ConvertOptions, Converted, FileOutcome, convert_directory, convert_file,
    find_heic_files, output_path_for,
};
#[cfg(feature = "libheif")]
pub use decode::LibHeifDecoder;
pub use decode::HeicDecoder;
pub use types::*;
