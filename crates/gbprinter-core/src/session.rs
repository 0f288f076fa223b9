//! Print session state machine.
//!
//! A [`Session`] consumes classified lines strictly in arrival order. INIT
//! starts a new job (tiles and raw-line log reset), data lines append tiles,
//! PRNT renders the accumulated tiles and hands the image to the configured
//! [`OutputSink`]. Protocol errors are non-fatal: they are logged, recorded as
//! diagnostics and the offending line is dropped. Source and sink failures
//! end the session.

use std::collections::BTreeMap;
use std::path::Path;

use image::GrayImage;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::protocol::layout::TILE_HEX_LEN;
use crate::protocol::{
    Command, DecodeError, Line, ProtocolError, Tile, classify_line, decode_tile,
};
use crate::render::{ConfigError, Palette, RowPolicy, render_tiles};
use crate::sink::{OutputSink, SinkError};
use crate::source::{LineSource, ReaderLineSource, SourceError};
use crate::{Diagnostic, SUMMARY_VERSION, SessionSummary, ToolInfo};

pub const DIAG_MALFORMED_COMMAND: &str = "GBP-MALFORMED-COMMAND";
pub const DIAG_DATA_LENGTH: &str = "GBP-DATA-LENGTH";
pub const DIAG_INVALID_HEX: &str = "GBP-INVALID-HEX";
pub const DIAG_EMPTY_PRINT: &str = "GBP-EMPTY-PRINT";

const MAX_DIAGNOSTIC_EXAMPLES: usize = 3;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Session options, fixed for the lifetime of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Show images instead of writing them.
    pub display_only: bool,
    /// Also persist the raw lines of each job next to its image.
    pub log_input: bool,
    /// Pixel block size multiplier (≥ 1).
    pub scale: u32,
    pub rows: RowPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            display_only: false,
            log_input: false,
            scale: 1,
            rows: RowPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing processed yet.
    Idle,
    /// At least one non-blank line seen.
    Accumulating,
}

#[derive(Debug, Default)]
struct PrintJob {
    tiles: Vec<Tile>,
    lines: Vec<String>,
}

impl PrintJob {
    fn clear(&mut self) {
        self.tiles.clear();
        self.lines.clear();
    }
}

#[derive(Debug, Default)]
struct SessionStats {
    lines_total: u64,
    lines_blank: u64,
    tiles_decoded: u64,
    jobs_started: u64,
    outputs: Vec<String>,
    diagnostics: BTreeMap<&'static str, Diagnostic>,
}

impl SessionStats {
    fn record(&mut self, id: &'static str, severity: &str, message: &str, example: &str) {
        let entry = self.diagnostics.entry(id).or_insert_with(|| Diagnostic {
            id: id.to_string(),
            severity: severity.to_string(),
            message: message.to_string(),
            count: 0,
            examples: Vec::new(),
        });
        entry.count += 1;
        if entry.examples.len() < MAX_DIAGNOSTIC_EXAMPLES {
            entry.examples.push(example.to_string());
        }
    }
}

pub struct Session<S> {
    config: SessionConfig,
    palette: Palette,
    sink: S,
    started_at: String,
    stamp: String,
    counter: u32,
    state: SessionState,
    job: PrintJob,
    stats: SessionStats,
}

impl<S: OutputSink> Session<S> {
    /// Start a session stamped with the current UTC time.
    pub fn new(config: SessionConfig, sink: S) -> Result<Self, SessionError> {
        Self::with_start_time(config, sink, OffsetDateTime::now_utc())
    }

    pub fn with_start_time(
        config: SessionConfig,
        sink: S,
        started_at: OffsetDateTime,
    ) -> Result<Self, SessionError> {
        let palette = Palette::build(config.scale)?;
        let stamp = started_at.format(format_description!(
            "[year][month][day]-[hour][minute][second]"
        ))?;
        Ok(Self {
            config,
            palette,
            sink,
            started_at: started_at.format(&Rfc3339)?,
            stamp,
            counter: 0,
            state: SessionState::Idle,
            job: PrintJob::default(),
            stats: SessionStats::default(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of images flushed so far.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.job.tiles
    }

    pub fn raw_lines(&self) -> &[String] {
        &self.job.lines
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Output name for the next flush: `<timestamp>-<NNNN>`.
    pub fn next_basename(&self) -> String {
        format!("{}-{:04}", self.stamp, self.counter)
    }

    /// Process one line (already stripped of its terminator).
    ///
    /// Only sink failures are returned; protocol errors are recorded and
    /// the session carries on.
    pub fn process_line(&mut self, line: &str) -> Result<(), SessionError> {
        self.stats.lines_total += 1;
        let classified = match classify_line(line) {
            Ok(Line::Blank) => {
                self.stats.lines_blank += 1;
                return Ok(());
            }
            other => other,
        };

        self.state = SessionState::Accumulating;
        if matches!(classified, Ok(Line::Command(Command::Init))) {
            self.job.clear();
        }
        self.job.lines.push(line.to_string());

        match classified {
            Ok(Line::Blank | Line::Comment) => log::debug!("comment: {line}"),
            Ok(Line::Command(command)) => self.handle_command(command)?,
            Ok(Line::Data(hex)) => self.handle_data(line, &hex),
            Err(err) => self.report(&err, line),
        }
        Ok(())
    }

    fn handle_command(&mut self, command: Command) -> Result<(), SessionError> {
        match command {
            Command::Init => {
                self.stats.jobs_started += 1;
                log::info!("print job started");
            }
            Command::Print => self.flush()?,
            Command::Unknown(name) => log::debug!("ignoring command {name:?}"),
        }
        Ok(())
    }

    fn handle_data(&mut self, line: &str, hex: &str) {
        let length = hex.chars().count();
        if length != TILE_HEX_LEN {
            let err = ProtocolError::DataLineLength {
                line: line.to_string(),
                length,
            };
            self.report(&err, line);
            return;
        }
        match decode_tile(hex) {
            Ok(tile) => {
                self.job.tiles.push(tile);
                self.stats.tiles_decoded += 1;
            }
            Err(err) => self.report(&ProtocolError::Decode(err), line),
        }
    }

    fn report(&mut self, err: &ProtocolError, line: &str) {
        log::warn!("{err}");
        let (id, message) = match err {
            ProtocolError::MalformedCommand { .. } => {
                (DIAG_MALFORMED_COMMAND, "Command frame is not valid JSON")
            }
            ProtocolError::DataLineLength { .. }
            | ProtocolError::Decode(DecodeError::InvalidLength { .. }) => {
                (DIAG_DATA_LENGTH, "Data line is not 16 bytes")
            }
            ProtocolError::Decode(DecodeError::InvalidHex { .. }) => {
                (DIAG_INVALID_HEX, "Data line contains non-hex characters")
            }
        };
        self.stats.record(id, "error", message, line);
    }

    fn flush(&mut self) -> Result<(), SessionError> {
        let image = render_tiles(&self.job.tiles, &self.palette, self.config.rows);
        if image.height() == 0 {
            log::warn!(
                "print with {} tile(s) produced an empty image; nothing written",
                self.job.tiles.len()
            );
            self.stats.record(
                DIAG_EMPTY_PRINT,
                "warning",
                "Print command produced an empty image",
                &format!("{} tile(s)", self.job.tiles.len()),
            );
            return Ok(());
        }

        let basename = self.next_basename();
        self.emit(&image, &basename)?;
        log::info!(
            "print {} flushed ({}x{}, {} tile(s))",
            basename,
            image.width(),
            image.height(),
            self.job.tiles.len()
        );
        self.stats.outputs.push(basename);
        self.counter += 1;
        Ok(())
    }

    fn emit(&mut self, image: &GrayImage, basename: &str) -> Result<(), SinkError> {
        if self.config.display_only {
            return self.sink.display(image);
        }
        self.sink.persist(image, basename)?;
        if self.config.log_input {
            self.sink.persist_log(&self.job.lines, basename)?;
        }
        Ok(())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            summary_version: SUMMARY_VERSION,
            tool: ToolInfo {
                name: "gbprinter".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            started_at: self.started_at.clone(),
            lines_total: self.stats.lines_total,
            lines_blank: self.stats.lines_blank,
            tiles_decoded: self.stats.tiles_decoded,
            jobs_started: self.stats.jobs_started,
            prints_total: u64::from(self.counter),
            outputs: self.stats.outputs.clone(),
            diagnostics: self.stats.diagnostics.values().cloned().collect(),
        }
    }
}

/// Drive a session until the source is exhausted.
pub fn run_session<L: LineSource, S: OutputSink>(
    source: &mut L,
    session: &mut Session<S>,
) -> Result<SessionSummary, SessionError> {
    while let Some(line) = source.next_line()? {
        session.process_line(&line)?;
    }
    Ok(session.summary())
}

/// Decode a captured emulator log file end to end.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use gbprinter_core::{DirectorySink, SessionConfig, decode_file};
///
/// let summary = decode_file(
///     Path::new("capture.txt"),
///     SessionConfig::default(),
///     DirectorySink::new("out"),
/// )?;
/// println!("images written: {}", summary.prints_total);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode_file<S: OutputSink>(
    path: &Path,
    config: SessionConfig,
    sink: S,
) -> Result<SessionSummary, SessionError> {
    let mut source = ReaderLineSource::open(path)?;
    let mut session = Session::new(config, sink)?;
    run_session(&mut source, &mut session)
}
