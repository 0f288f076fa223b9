mod reader;
mod serial;

pub use reader::ReaderLineSource;
pub use serial::{SERIAL_BAUD_RATE, SerialLineSource};

use thiserror::Error;

/// Pull-based supplier of protocol lines.
///
/// `Ok(None)` marks the end of the session: end of file, or a serial read
/// timeout.
pub trait LineSource {
    fn next_line(&mut self) -> Result<Option<String>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported source: {0}")]
    Unsupported(String),
}
