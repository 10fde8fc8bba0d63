//! Duplicate a single page of a PDF into a new document

mod io;
mod repeat;

pub use io::{load_pdf, save_pdf};
pub use repeat::repeat_page;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepeatError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Page number {page} out of range. PDF has {total} pages.")]
    PageOutOfRange { page: u32, total: usize },
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RepeatError>;
