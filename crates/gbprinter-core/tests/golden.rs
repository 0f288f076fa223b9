use std::fs;
use std::path::{Path, PathBuf};

use gbprinter_core::{
    DirectorySink, ReaderLineSource, Session, SessionConfig, SessionSummary, run_session,
};
use tempfile::TempDir;
use time::macros::datetime;

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn load_expected_summary(dir: &str) -> SessionSummary {
    let expected_path = repo_root().join(dir).join("expected_summary.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_summary.json");
    serde_json::from_str(&expected_json).expect("parse expected summary")
}

fn run_golden(dir: &str) -> (SessionSummary, TempDir) {
    let input = repo_root().join(dir).join("input.txt");
    let out = TempDir::new().expect("tempdir");

    let mut source = ReaderLineSource::open(&input).expect("open input");
    let mut session = Session::with_start_time(
        SessionConfig::default(),
        DirectorySink::new(out.path()),
        datetime!(2026-10-17 12:34:56 UTC),
    )
    .expect("session");
    let mut actual = run_session(&mut source, &mut session).expect("decode");

    let expected = load_expected_summary(dir);
    actual.tool.version = expected.tool.version.clone();
    let actual_value = serde_json::to_value(&actual).expect("serialize actual");
    let expected_value = serde_json::to_value(&expected).expect("serialize expected");
    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");

    (actual, out)
}

fn image_dimensions(dir: &Path, basename: &str) -> (u32, u32) {
    image::image_dimensions(dir.join(format!("{basename}.png"))).expect("read png")
}

#[test]
fn golden_single_row() {
    let (summary, out) = run_golden("tests/golden/single_row");
    assert_eq!(image_dimensions(out.path(), &summary.outputs[0]), (160, 8));
}

#[test]
fn golden_two_jobs_with_errors() {
    let (summary, out) = run_golden("tests/golden/two_jobs_with_errors");
    // 21 tiles: the partial second row is kept.
    assert_eq!(image_dimensions(out.path(), &summary.outputs[0]), (160, 16));
    assert!(!out.path().join("20261017-123456-0001.png").exists());
}

#[test]
fn golden_two_jobs_diagnostics_are_sorted() {
    let summary = load_expected_summary("tests/golden/two_jobs_with_errors");
    let ids: Vec<_> = summary.diagnostics.iter().map(|d| d.id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn log_input_writes_matching_text_file() {
    let input = repo_root()
        .join("tests")
        .join("golden")
        .join("single_row")
        .join("input.txt");
    let out = TempDir::new().expect("tempdir");
    let config = SessionConfig {
        log_input: true,
        scale: 3,
        ..SessionConfig::default()
    };

    let summary =
        gbprinter_core::decode_file(&input, config, DirectorySink::new(out.path())).unwrap();
    let basename = &summary.outputs[0];

    assert_eq!(image_dimensions(out.path(), basename), (480, 24));
    let log = fs::read_to_string(out.path().join(format!("{basename}.txt"))).unwrap();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.first(), Some(&r#"!{"command":"INIT"}"#));
    assert_eq!(lines.len(), 22);
    assert!(lines[21].starts_with(r#"!{"command":"PRNT""#));
}
