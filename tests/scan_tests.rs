// tests/scan_tests.rs

//! Tests of the public `lwslib` API, scanning temporary directory trees
//! end to end.

#![allow(non_snake_case)]

extern crate lwslib;

use lwslib::common::{EpochMillis, FPath};
use lwslib::data::datetime::{parse_window_bound, ScanWindow};
use lwslib::data::diagnostic::{Diagnostic, DiagnosticsCollect};
use lwslib::data::logentry::EntryKind;
use lwslib::data::timestamprule::TimestampRule;
use lwslib::printer::printers::PrinterGroup;
use lwslib::readers::cancel::CancelToken;
use lwslib::readers::entryfilter::LevelFilter;
use lwslib::readers::scanner::{scan, scan_with_summary, ProgressNull, ScanConfig};

use std::fs::{create_dir_all, write};
use std::path::Path;

extern crate tempfile;
use tempfile::TempDir;

extern crate termcolor;
use termcolor::NoColor;

/// 2023-01-01T00:00:00Z
const JAN1: EpochMillis = 1_672_531_200_000;

fn create_tree(files: &[(&str, &str)]) -> TempDir {
    let tmpdir = match tempfile::Builder::new()
        .prefix("tmp-lws-it-")
        .tempdir()
    {
        Ok(tmpdir) => tmpdir,
        Err(err) => panic!("tempdir failed {}", err),
    };
    for (relpath, data) in files.iter() {
        let path = tmpdir.path().join(relpath);
        if let Some(parent) = path.parent() {
            create_dir_all(parent).unwrap();
        }
        write(&path, data).unwrap();
    }

    tmpdir
}

fn root(tmpdir: &TempDir) -> FPath {
    tmpdir.path().to_string_lossy().to_string()
}

fn relative(
    tmpdir: &TempDir,
    path: &str,
) -> String {
    Path::new(path)
        .strip_prefix(tmpdir.path())
        .unwrap()
        .to_string_lossy()
        .replace('\\', "/")
}

const APP_LOG: &str = r#"2023-01-01T00:00:00Z INFO service start
2023-01-01T00:00:01Z DEBUG config loaded
  continuation line without timestamp
2023-01-01T00:00:02Z WARN slow disk
{
  "timestamp": "2023-01-01T00:00:03Z",
  "level": "error",
  "detail": {"code": 7}
}
2023-01-01T00:00:04Z ERROR request failed
2023-01-01T00:00:09Z INFO service stop
"#;

const WORKER_LOG: &str = r#"[1672531202] INFO job 1
[1672531205] ERROR job 2
"#;

#[test]
fn test_scan_mixed_tree() {
    let tmpdir = create_tree(&[
        ("app.log", APP_LOG),
        ("workers/w1.log", WORKER_LOG),
        ("archive/app.log.1", "2023-01-01T00:00:03Z INFO archived\n"),
        ("README.txt", "2023-01-01T00:00:03Z INFO not a log\n"),
    ]);
    let config = ScanConfig {
        rules: vec![TimestampRule::new(r"^\[(\d+)\]", "X")],
        include: vec![String::from("**/*.log")],
        exclude: vec![String::from("archive/**")],
        workers: 2,
        ..Default::default()
    };
    let window = ScanWindow::new(
        parse_window_bound("2023-01-01T00:00:01Z").unwrap(),
        parse_window_bound("@1672531205").unwrap(),
    );
    let diagnostics = DiagnosticsCollect::new();
    let groups = scan(&root(&tmpdir), &window, &config, &CancelToken::new(), &diagnostics).unwrap();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());

    let found: Vec<(String, u64, EpochMillis, EntryKind)> = groups
        .iter()
        .flat_map(|g| g.entries.iter())
        .map(|e| (relative(&tmpdir, &e.file_path), e.line_number, e.timestamp_millis, e.kind))
        .collect();
    assert_eq!(
        found,
        vec![
            (String::from("app.log"), 2, JAN1 + 1000, EntryKind::Plain),
            (String::from("app.log"), 4, JAN1 + 2000, EntryKind::Plain),
            (String::from("workers/w1.log"), 1, JAN1 + 2000, EntryKind::Plain),
            (String::from("app.log"), 5, JAN1 + 3000, EntryKind::Json),
            (String::from("app.log"), 10, JAN1 + 4000, EntryKind::Plain),
            (String::from("workers/w1.log"), 2, JAN1 + 5000, EntryKind::Plain),
        ]
    );
    assert_eq!(groups.len(), 4);
}

#[test]
fn test_scan_levels_and_print() {
    let tmpdir = create_tree(&[("app.log", APP_LOG)]);
    let config = ScanConfig {
        levels: LevelFilter::from_names(&["error", "warn"]).unwrap(),
        keywords: vec![String::from("failed")],
        ..Default::default()
    };
    let groups = scan(
        &root(&tmpdir),
        &ScanWindow::all(),
        &config,
        &CancelToken::new(),
        &DiagnosticsCollect::new(),
    )
    .unwrap();
    let mut printer = PrinterGroup::new(NoColor::new(Vec::<u8>::new()), &config.keywords);
    printer.print_groups(&groups).unwrap();
    let printed = String::from_utf8(printer.into_inner().into_inner()).unwrap();
    let lines: Vec<&str> = printed.lines().skip(1).collect();
    assert_eq!(
        lines,
        vec![
            "4: 2023-01-01T00:00:02Z WARN slow disk",
            "5: {",
            "6:   \"timestamp\": \"2023-01-01T00:00:03Z\",",
            "7:   \"level\": \"error\",",
            "8:   \"detail\": {\"code\": 7}",
            "9: }",
            "10: 2023-01-01T00:00:04Z ERROR request failed",
        ]
    );
}

#[test]
fn test_scan_summary_and_diagnostics() {
    let tmpdir = create_tree(&[
        ("a.log", "{\n  \"msg\": \"no time\"\n}\n2023-01-01T00:00:00Z INFO ok\n{\n"),
    ]);
    let diagnostics = DiagnosticsCollect::new();
    let output = scan_with_summary(
        &root(&tmpdir),
        &ScanWindow::all(),
        &ScanConfig::default(),
        &CancelToken::new(),
        &diagnostics,
        &ProgressNull,
    )
    .unwrap();
    assert_eq!(output.entries_count(), 1);
    let summary = &output.summaries[0];
    assert_eq!(summary.parser.lines_read, 5);
    assert_eq!(summary.parser.json_blocks, 2);
    assert_eq!(summary.parser.json_dropped, 2);
    assert_eq!(summary.accepted, 1);
    let diags = diagnostics.diagnostics();
    assert_eq!(diags.len(), 2, "{:?}", diags);
    assert!(matches!(diags[0], Diagnostic::JsonNoTimestamp(_, 1)));
    assert!(matches!(diags[1], Diagnostic::JsonUnterminated(_, 5)));
}
