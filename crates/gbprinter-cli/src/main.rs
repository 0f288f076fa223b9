use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use gbprinter_core::{
    DirectorySink, ReaderLineSource, RowPolicy, SerialLineSource, Session, SessionConfig,
    SessionSummary, run_session,
};
use glob::glob;

mod viewer;

use viewer::{DEFAULT_VIEWER, ViewerSink};

#[derive(Parser, Debug)]
#[command(name = "gbprinter")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GBPRINTER_BUILD_COMMIT"),
    " ",
    env!("GBPRINTER_BUILD_DATE"),
    ")"
))]
#[command(
    about = "Decodes Game Boy Printer emulator output into grayscale images.",
    long_about = None,
    after_help = "Examples:\n  gbprinter decode -f printer.log\n  gbprinter decode -s /dev/ttyUSB0 --log-input -o prints\n  gbprinter decode -f printer.log --display-only --scale 3"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a printer log (file or serial stream) into one image per print.
    #[command(alias = "print")]
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Read lines from a captured log file (glob patterns allowed)
    #[arg(
        short = 'f',
        long,
        conflicts_with = "read_serial",
        required_unless_present = "read_serial"
    )]
    input_file: Option<PathBuf>,

    /// Read lines from a serial device at 115200 baud
    #[arg(short = 's', long, value_name = "DEVICE")]
    read_serial: Option<PathBuf>,

    /// Serial read timeout in seconds; a quiet line ends the session
    #[arg(long, default_value_t = 10, value_name = "SECS")]
    timeout: u64,

    /// Only display images, do not save them
    #[arg(short = 'd', long)]
    display_only: bool,

    /// Also save the raw input lines of each print next to its image
    #[arg(short = 'l', long)]
    log_input: bool,

    /// Pixel scale factor
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    scale: u32,

    /// Directory for images and input logs
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// Drop a trailing partial row of tiles (legacy output)
    #[arg(long)]
    legacy_rows: bool,

    /// Image viewer command used with --display-only
    #[arg(long, default_value = DEFAULT_VIEWER)]
    viewer: String,

    /// Write a JSON session summary to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Pretty-print the JSON summary
    #[arg(long)]
    pretty: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if protocol diagnostics were recorded
    #[arg(long)]
    strict: bool,

    /// List protocol diagnostics after decoding
    #[arg(long)]
    list_diagnostics: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode(args) => {
            init_logging(args.quiet);
            cmd_decode(args)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(quiet: bool) {
    let level = if quiet { "error" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_decode(args: DecodeArgs) -> Result<(), CliError> {
    let config = SessionConfig {
        display_only: args.display_only,
        log_input: args.log_input,
        scale: args.scale,
        rows: if args.legacy_rows {
            RowPolicy::Truncate
        } else {
            RowPolicy::RoundUp
        },
    };
    let sink = ViewerSink::new(args.viewer.clone(), DirectorySink::new(&args.output_dir));
    let mut session = Session::new(config, sink).context("Failed to start session")?;

    let summary = match (&args.input_file, &args.read_serial) {
        (Some(input), _) => {
            let resolved = resolve_input_path(input)?;
            validate_input_file(&resolved)?;
            let mut source = ReaderLineSource::open(&resolved)
                .with_context(|| format!("Failed to open input file: {}", resolved.display()))?;
            run_session(&mut source, &mut session)
                .with_context(|| format!("Decoding failed: {}", resolved.display()))?
        }
        (None, Some(device)) => {
            let mut source = SerialLineSource::open(device, Duration::from_secs(args.timeout))
                .map_err(|err| {
                    CliError::new(
                        format!("cannot open serial device {}: {}", device.display(), err),
                        Some("check the device path and dialout permissions".to_string()),
                    )
                })?;
            run_session(&mut source, &mut session)
                .with_context(|| format!("Decoding failed: {}", device.display()))?
        }
        (None, None) => {
            return Err(CliError::new(
                "missing input",
                Some("use -f/--input-file or -s/--read-serial".to_string()),
            ));
        }
    };

    if let Some(path) = args.summary.as_ref() {
        write_summary(&summary, path, args.pretty)?;
    }
    if args.list_diagnostics && !args.quiet {
        print_diagnostics(&summary);
    }
    if !args.quiet {
        if args.display_only {
            eprintln!("OK: {} image(s) displayed", summary.prints_total);
        } else {
            eprintln!(
                "OK: {} image(s) written -> {}",
                summary.prints_total,
                args.output_dir.display()
            );
        }
    }
    if args.strict && !summary.diagnostics.is_empty() {
        return Err(CliError::new(
            "protocol diagnostics detected",
            Some("use --list-diagnostics to inspect".to_string()),
        ));
    }
    Ok(())
}

fn write_summary(summary: &SessionSummary, path: &Path, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(summary)
    } else {
        serde_json::to_string(summary)
    }
    .context("JSON serialization failed")?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create summary directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, json)
        .with_context(|| format!("Failed to write summary: {}", path.display()))?;
    Ok(())
}

fn print_diagnostics(summary: &SessionSummary) {
    eprintln!("Protocol diagnostics:");
    for diagnostic in &summary.diagnostics {
        eprintln!(
            "  {} {} ({})",
            diagnostic.severity, diagnostic.id, diagnostic.count
        );
        for example in &diagnostic.examples {
            eprintln!("    {}", example);
        }
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a printer emulator log captured to a text file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a printer emulator log captured to a text file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single log file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
