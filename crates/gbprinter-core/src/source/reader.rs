use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{LineSource, SourceError};

/// Newline-delimited text from any buffered reader.
///
/// Lines are decoded lossily and trimmed of surrounding whitespace.
pub struct ReaderLineSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> ReaderLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl ReaderLineSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource for ReaderLineSource<R> {
    fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::ReaderLineSource;
    use crate::source::LineSource;

    #[test]
    fn yields_trimmed_lines_then_none() {
        let mut source = ReaderLineSource::new(Cursor::new("  # hi \r\n\nFF 00\n!{}"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("# hi"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some(""));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("FF 00"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("!{}"));
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let bytes: &[u8] = &[0x46, 0xff, 0x0a];
        let mut source = ReaderLineSource::new(Cursor::new(bytes));
        let line = source.next_line().unwrap().unwrap();
        assert!(line.starts_with('F'));
        assert!(line.contains('\u{fffd}'));
    }
}
