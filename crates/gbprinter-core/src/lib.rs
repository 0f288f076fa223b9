//! Game Boy Printer emulator log decoder.
//!
//! The printer emulator streams text lines: `!`-prefixed JSON command frames
//! (`INIT`, `PRNT`) interleaved with hex-encoded 2bpp tiles. This crate
//! classifies those lines, decodes tiles, lays them out on a 20-tile-wide
//! grayscale canvas and hands each finished print to an output sink.
//! Parsing and rendering are pure; line sources and sinks hold all I/O.
//!
//! Invariants:
//! - A tile is always 8×8 with every value in `0..=3`.
//! - A job's raw-line log always starts with the INIT line that opened it.
//! - The output counter advances only after a successful flush.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use gbprinter_core::{DirectorySink, SessionConfig, decode_file};
//!
//! let summary = decode_file(
//!     Path::new("printer.log"),
//!     SessionConfig::default(),
//!     DirectorySink::new("prints"),
//! )?;
//! println!("prints: {}", summary.prints_total);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod protocol;
mod render;
mod session;
mod sink;
mod source;

pub use protocol::{Command, DecodeError, Line, ProtocolError, Tile, classify_line, decode_tile};
pub use render::{ConfigError, Palette, RowPolicy, render_tiles};
pub use session::{
    DIAG_DATA_LENGTH, DIAG_EMPTY_PRINT, DIAG_INVALID_HEX, DIAG_MALFORMED_COMMAND, Session,
    SessionConfig, SessionError, SessionState, decode_file, run_session,
};
pub use sink::{DirectorySink, OutputSink, SinkError};
pub use source::{LineSource, ReaderLineSource, SERIAL_BAUD_RATE, SerialLineSource, SourceError};

/// Current summary schema version.
pub const SUMMARY_VERSION: u32 = 1;

/// Outcome of one decoding session.
///
/// # Examples
/// ```
/// use gbprinter_core::{ReaderLineSource, Session, SessionConfig, DirectorySink, run_session};
///
/// let mut source = ReaderLineSource::new(std::io::Cursor::new("# nothing to print\n"));
/// let mut session = Session::new(SessionConfig::default(), DirectorySink::new("prints"))?;
/// let summary = run_session(&mut source, &mut session)?;
/// assert_eq!(summary.prints_total, 0);
/// assert_eq!(summary.lines_total, 1);
/// # Ok::<(), gbprinter_core::SessionError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Summary schema version (not the binary version).
    pub summary_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 session start time; output names derive from it.
    pub started_at: String,
    /// All lines pulled from the source, blank ones included.
    pub lines_total: u64,
    pub lines_blank: u64,
    pub tiles_decoded: u64,
    /// INIT commands seen.
    pub jobs_started: u64,
    /// Images handed to the sink.
    pub prints_total: u64,
    /// Output basenames in flush order.
    pub outputs: Vec<String>,
    /// Non-fatal problems, sorted by id.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Aggregated non-fatal problem.
///
/// # Examples
/// ```
/// use gbprinter_core::Diagnostic;
///
/// let diagnostic = Diagnostic {
///     id: "GBP-DATA-LENGTH".to_string(),
///     severity: "error".to_string(),
///     message: "Data line is not 16 bytes".to_string(),
///     count: 1,
///     examples: vec!["00 00 00".to_string()],
/// };
/// assert_eq!(diagnostic.count, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable identifier (e.g., `GBP-MALFORMED-COMMAND`).
    pub id: String,
    /// `error` or `warning`.
    pub severity: String,
    pub message: String,
    pub count: u64,
    /// At most three offending lines.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_omits_empty_examples() {
        let summary = SessionSummary {
            summary_version: SUMMARY_VERSION,
            tool: ToolInfo {
                name: "gbprinter".to_string(),
                version: "0.1.0".to_string(),
            },
            started_at: "2026-10-17T12:34:56Z".to_string(),
            lines_total: 2,
            lines_blank: 0,
            tiles_decoded: 0,
            jobs_started: 1,
            prints_total: 0,
            outputs: vec![],
            diagnostics: vec![Diagnostic {
                id: DIAG_EMPTY_PRINT.to_string(),
                severity: "warning".to_string(),
                message: "Print command produced an empty image".to_string(),
                count: 1,
                examples: vec![],
            }],
        };

        let value = serde_json::to_value(&summary).expect("summary json");
        let diagnostic = &value["diagnostics"][0];
        assert!(diagnostic.get("examples").is_none());

        let back: SessionSummary = serde_json::from_value(value).expect("summary roundtrip");
        assert_eq!(back, summary);
    }
}
