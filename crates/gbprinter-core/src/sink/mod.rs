//! Output sinks for finished print jobs.

mod directory;

pub use directory::DirectorySink;

use image::GrayImage;
use thiserror::Error;

/// Destination for rendered images and raw job logs.
pub trait OutputSink {
    fn display(&mut self, image: &GrayImage) -> Result<(), SinkError>;
    fn persist(&mut self, image: &GrayImage, basename: &str) -> Result<(), SinkError>;
    fn persist_log(&mut self, lines: &[String], basename: &str) -> Result<(), SinkError>;
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("cannot display image: {0}")]
    Viewer(String),
}
