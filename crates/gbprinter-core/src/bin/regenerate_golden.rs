use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use gbprinter_core::{DirectorySink, ReaderLineSource, Session, SessionConfig, run_session};
use time::macros::datetime;

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;
    let scratch = std::env::temp_dir().join("gbprinter-golden");

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.txt");
        if !input.exists() {
            continue;
        }
        let output = path.join("expected_summary.json");
        regenerate_one(&input, &output, &scratch)?;
    }

    Ok(())
}

fn regenerate_one(input: &Path, output: &Path, scratch: &Path) -> Result<(), String> {
    let mut source = ReaderLineSource::open(input)
        .map_err(|err| format!("failed to open {}: {}", input.display(), err))?;
    let mut session = Session::with_start_time(
        SessionConfig::default(),
        DirectorySink::new(scratch),
        datetime!(2026-10-17 12:34:56 UTC),
    )
    .map_err(|err| format!("session setup failed: {}", err))?;
    let summary = run_session(&mut source, &mut session)
        .map_err(|err| format!("decoding failed for {}: {}", input.display(), err))?;
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
