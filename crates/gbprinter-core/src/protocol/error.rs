use thiserror::Error;

/// Errors returned by tile decoding.
///
/// # Examples
/// ```
/// use gbprinter_core::DecodeError;
///
/// let err = DecodeError::InvalidHex { position: 3, found: 'z' };
/// assert!(err.to_string().contains("invalid hex digit"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid tile length: need {expected} hex digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid hex digit {found:?} at position {position}")]
    InvalidHex { position: usize, found: char },
}

/// Non-fatal errors raised while classifying and decoding protocol lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("malformed command: {message}")]
    MalformedCommand { message: String },
    #[error("data line not 16 bytes ({length} hex digits): {line}")]
    DataLineLength { line: String, length: usize },
    #[error("tile decode failed: {0}")]
    Decode(#[from] DecodeError),
}
