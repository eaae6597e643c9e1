// src/tests/scanner_tests.rs

//! tests for `scanner.rs`

#![allow(non_snake_case)]

use crate::common::{Count, EpochMillis, FPath};
use crate::data::datetime::ScanWindow;
use crate::data::diagnostic::{Diagnostic, DiagnosticsCollect, DiagnosticsNull};
use crate::data::group::Groups;
use crate::data::logentry::{EntryKind, Level};
use crate::data::timestamprule::TimestampRule;
use crate::debug::helpers::{create_files_and_tmpdir, relative_fpath, tmpdir_fpath, TempDir};
use crate::readers::cancel::CancelToken;
use crate::readers::entryfilter::LevelFilter;
use crate::readers::scanner::{
    scan,
    scan_with_summary,
    ProgressFn,
    ProgressNull,
    ScanConfig,
    ScanError,
    ScanOutput,
    TIMESTAMP_FIELDS_DEF,
    WORKERS_DEF,
};
use crate::readers::summary::FileProcessingResult;

use std::collections::BTreeSet;
use std::sync::Mutex;

extern crate si_trace_print;
use si_trace_print::stack::stack_offset_set;

extern crate test_case;
use test_case::test_case;

/// 2023-01-01T00:00:00Z
const JAN1: EpochMillis = 1_672_531_200_000;

fn scan_groups(
    tmpdir: &TempDir,
    window: &ScanWindow,
    config: &ScanConfig,
) -> Groups {
    match scan(&tmpdir_fpath(tmpdir), window, config, &CancelToken::new(), &DiagnosticsNull) {
        Ok(groups) => groups,
        Err(err) => panic!("scan failed {}", err),
    }
}

/// `(relative path, line number)` of every entry, in output order
fn flatten(
    tmpdir: &TempDir,
    groups: &Groups,
) -> Vec<(String, u64)> {
    groups
        .iter()
        .flat_map(|g| g.entries.iter())
        .map(|e| (relative_fpath(tmpdir.path(), &e.file_path), e.line_number))
        .collect()
}

#[test]
fn test_ScanConfig_default() {
    let config = ScanConfig::default();
    assert_eq!(config.workers, WORKERS_DEF);
    assert_eq!(config.levels, LevelFilter::All);
    assert_eq!(config.include, vec![String::from("**/*")]);
    assert!(config.exclude.is_empty());
    assert_eq!(config.timestamp_fields.len(), TIMESTAMP_FIELDS_DEF.len());
    assert_eq!(config.timestamp_fields[0], "timestamp");
    assert!(!config.parallel_walk);
}

#[test]
fn test_scan_window_and_all_levels() {
    stack_offset_set(Some(2));
    let (tmpdir, _) = create_files_and_tmpdir(&[(
        "a.log",
        "2023-01-01T00:00:00Z INFO start\n2023-01-01T00:00:05Z ERROR boom\n",
    )]);
    let window = ScanWindow::new(JAN1, JAN1 + 3000);
    let groups = scan_groups(&tmpdir, &window, &ScanConfig::default());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 1);
    assert_eq!(groups[0].entries[0].raw_text, "2023-01-01T00:00:00Z INFO start");
    assert_eq!(groups[0].entries[0].severity, Some(Level::Info));
}

#[test]
fn test_scan_time_only_rule() {
    let (tmpdir, _) = create_files_and_tmpdir(&[("t.log", "10:00:00 x\n10:00:01 y\n")]);
    let config = ScanConfig {
        rules: vec![TimestampRule::new(r"^\d{2}:\d{2}:\d{2}", "HH:mm:ss")],
        ..Default::default()
    };
    let window = ScanWindow::new(36_000_000, 36_059_999);
    let groups = scan_groups(&tmpdir, &window, &config);
    let ts: Vec<EpochMillis> = groups
        .iter()
        .flat_map(|g| g.entries.iter())
        .map(|e| e.timestamp_millis)
        .collect();
    assert_eq!(ts, vec![36_000_000, 36_001_000]);
}

#[test]
fn test_scan_include_exclude() {
    let (tmpdir, _) = create_files_and_tmpdir(&[
        ("app.log", "2023-01-01T00:00:00Z INFO app\n"),
        ("archive/old.log", "2023-01-01T00:00:00Z INFO old\n"),
        ("notes.txt", "2023-01-01T00:00:00Z INFO notes\n"),
    ]);
    let config = ScanConfig {
        include: vec![String::from("**/*.log")],
        exclude: vec![String::from("**/archive/**")],
        ..Default::default()
    };
    let groups = scan_groups(&tmpdir, &ScanWindow::all(), &config);
    assert_eq!(flatten(&tmpdir, &groups), vec![(String::from("app.log"), 1)]);
}

#[test]
fn test_scan_cancel_after_first_file() {
    let (tmpdir, _) = create_files_and_tmpdir(&[
        ("a.log", "2023-01-01T00:00:00Z INFO a1\n2023-01-01T00:00:03Z INFO a2\n"),
        ("b.log", "2023-01-01T00:00:01Z INFO b1\n"),
        ("c.log", "2023-01-01T00:00:02Z INFO c1\n"),
    ]);
    let config = ScanConfig {
        workers: 1,
        ..Default::default()
    };
    let cancel = CancelToken::new();
    let cancel_ = cancel.clone();
    let done = Mutex::new(Vec::<(FPath, Count, usize, usize)>::new());
    let progress = ProgressFn(|path: &FPath, accepted: Count, files_done: usize, files_total: usize| {
        done.lock()
            .unwrap()
            .push((path.clone(), accepted, files_done, files_total));
        cancel_.cancel();
    });
    let output: ScanOutput = match scan_with_summary(
        &tmpdir_fpath(&tmpdir),
        &ScanWindow::all(),
        &config,
        &cancel,
        &DiagnosticsNull,
        &progress,
    ) {
        Ok(output) => output,
        Err(err) => panic!("scan_with_summary failed {}", err),
    };
    assert!(output.cancelled);
    assert_eq!(output.files_total, 3);
    assert_eq!(
        flatten(&tmpdir, &output.groups),
        vec![(String::from("a.log"), 1), (String::from("a.log"), 2)]
    );
    let done = done.into_inner().unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].1, 2);
    assert_eq!(done[0].2, 1);
    assert_eq!(done[0].3, 3);
    let results: Vec<FileProcessingResult> = output
        .summaries
        .iter()
        .map(|s| s.result.clone())
        .collect();
    assert_eq!(
        results,
        vec![
            FileProcessingResult::FileOk,
            FileProcessingResult::FileNotStarted,
            FileProcessingResult::FileNotStarted,
        ]
    );
}

#[test]
fn test_scan_cancelled_before_start() {
    let (tmpdir, _) = create_files_and_tmpdir(&[("a.log", "2023-01-01T00:00:00Z INFO a\n")]);
    let cancel = CancelToken::new();
    cancel.cancel();
    let groups = scan(
        &tmpdir_fpath(&tmpdir),
        &ScanWindow::all(),
        &ScanConfig::default(),
        &cancel,
        &DiagnosticsNull,
    );
    assert!(matches!(groups, Ok(ref g) if g.is_empty()));
}

#[test]
fn test_scan_inverted_window_empty() {
    let (tmpdir, _) = create_files_and_tmpdir(&[("a.log", "2023-01-01T00:00:00Z INFO a\n")]);
    let window = ScanWindow::new(JAN1 + 1, JAN1 - 1);
    let groups = scan_groups(&tmpdir, &window, &ScanConfig::default());
    assert!(groups.is_empty());
}

#[test]
fn test_scan_levels() {
    let (tmpdir, _) = create_files_and_tmpdir(&[(
        "a.log",
        r#"2023-01-01T00:00:00Z INFO a
2023-01-01T00:00:01Z ERROR b
2023-01-01T00:00:02Z no level
{"timestamp": "2023-01-01T00:00:03Z", "level": "debug"}
2023-01-01T00:00:04Z fatal c
"#,
    )]);
    let config = ScanConfig {
        levels: LevelFilter::from_names(&["ERROR", "FATAL"]).unwrap(),
        ..Default::default()
    };
    let groups = scan_groups(&tmpdir, &ScanWindow::all(), &config);
    let lines: Vec<u64> = flatten(&tmpdir, &groups)
        .into_iter()
        .map(|(_, line)| line)
        .collect();
    assert_eq!(lines, vec![2, 4, 5]);
    let kinds: Vec<EntryKind> = groups
        .iter()
        .flat_map(|g| g.entries.iter())
        .map(|e| e.kind)
        .collect();
    assert_eq!(kinds, vec![EntryKind::Plain, EntryKind::Json, EntryKind::Plain]);
}

#[test]
fn test_scan_interleaved_files_groups() {
    let (tmpdir, _) = create_files_and_tmpdir(&[
        ("a.log", "2023-01-01T00:00:00Z a1\n2023-01-01T00:00:02Z a2\n2023-01-01T00:00:03Z a3\n"),
        ("b.log", "2023-01-01T00:00:01Z b1\n"),
    ]);
    let groups = scan_groups(&tmpdir, &ScanWindow::all(), &ScanConfig::default());
    let shape: Vec<(String, usize)> = groups
        .iter()
        .map(|g| (relative_fpath(tmpdir.path(), &g.file_path), g.len()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (String::from("a.log"), 1),
            (String::from("b.log"), 1),
            (String::from("a.log"), 2),
        ]
    );
    assert_eq!(groups[2].start_timestamp, JAN1 + 2000);
    assert_eq!(groups[2].end_timestamp, JAN1 + 3000);
}

/// equal timestamps keep discovery order, files sorted by path
#[test_case(1)]
#[test_case(2)]
#[test_case(8)]
fn test_scan_ties_discovery_order(workers: usize) {
    let (tmpdir, _) = create_files_and_tmpdir(&[
        ("b.log", "2023-01-01T00:00:00Z b1\n2023-01-01T00:00:00Z b2\n"),
        ("a.log", "2023-01-01T00:00:00Z a1\n"),
        ("c/c.log", "2023-01-01T00:00:00Z c1\n"),
    ]);
    let config = ScanConfig {
        workers,
        ..Default::default()
    };
    let groups = scan_groups(&tmpdir, &ScanWindow::all(), &config);
    assert_eq!(
        flatten(&tmpdir, &groups),
        vec![
            (String::from("a.log"), 1),
            (String::from("b.log"), 1),
            (String::from("b.log"), 2),
            (String::from("c/c.log"), 1),
        ]
    );
    assert_eq!(groups.len(), 3);
}

#[test]
fn test_scan_idempotent() {
    let mut files = Vec::<(String, String)>::new();
    for n in 0..12 {
        let mut data = String::new();
        for i in 0..20 {
            data.push_str(format!("2023-01-01T00:{:02}:{:02}Z INFO f{} l{}\n", i % 7, n, n, i).as_str());
        }
        files.push((format!("d{}/f{}.log", n % 3, n), data));
    }
    let files_: Vec<(&str, &str)> = files
        .iter()
        .map(|(p, d)| (p.as_str(), d.as_str()))
        .collect();
    let (tmpdir, _) = create_files_and_tmpdir(&files_);
    let window = ScanWindow::new(JAN1 + 60_000, JAN1 + 300_000);
    let config = ScanConfig {
        workers: 4,
        parallel_walk: true,
        ..Default::default()
    };
    let groups1 = scan_groups(&tmpdir, &window, &config);
    let groups2 = scan_groups(&tmpdir, &window, &config);
    assert!(!groups1.is_empty());
    assert_eq!(groups1, groups2);
    // sorted by timestamp
    let ts: Vec<EpochMillis> = groups1
        .iter()
        .flat_map(|g| g.entries.iter())
        .map(|e| e.timestamp_millis)
        .collect();
    let mut ts_sorted = ts.clone();
    ts_sorted.sort();
    assert_eq!(ts, ts_sorted);
    assert!(ts.iter().all(|t| window.contains(*t)));
}

#[test]
fn test_scan_files_processed_once() {
    let (tmpdir, _) = create_files_and_tmpdir(&[
        ("a.log", "x\n"),
        ("b.log", "x\n"),
        ("c.log", "x\n"),
        ("d.log", "x\n"),
        ("e.log", "x\n"),
    ]);
    let seen = Mutex::new(Vec::<FPath>::new());
    let progress = ProgressFn(|path: &FPath, _accepted: Count, _files_done: usize, files_total: usize| {
        assert_eq!(files_total, 5);
        seen.lock().unwrap().push(path.clone());
    });
    let config = ScanConfig {
        workers: 3,
        ..Default::default()
    };
    let output = scan_with_summary(
        &tmpdir_fpath(&tmpdir),
        &ScanWindow::all(),
        &config,
        &CancelToken::new(),
        &DiagnosticsNull,
        &progress,
    )
    .unwrap();
    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 5);
    assert_eq!(seen.iter().collect::<BTreeSet<&FPath>>().len(), 5);
    assert!(!output.cancelled);
    assert!(output
        .summaries
        .iter()
        .all(|s| s.result == FileProcessingResult::FileOk));
    assert_eq!(output.entries_count(), 0);
}

#[test]
fn test_scan_root_not_exist() {
    let result = scan(
        &FPath::from("/this/path/does/not/exist/lws"),
        &ScanWindow::all(),
        &ScanConfig::default(),
        &CancelToken::new(),
        &DiagnosticsNull,
    );
    assert!(matches!(result, Err(ScanError::RootNotExist(_))));
}

#[test]
fn test_scan_empty_root() {
    let (tmpdir, _) = create_files_and_tmpdir(&[]);
    let output = scan_with_summary(
        &tmpdir_fpath(&tmpdir),
        &ScanWindow::all(),
        &ScanConfig::default(),
        &CancelToken::new(),
        &DiagnosticsNull,
        &ProgressNull,
    )
    .unwrap();
    assert_eq!(output.files_total, 0);
    assert!(output.groups.is_empty());
    assert!(output.summaries.is_empty());
}

#[test]
fn test_scan_bad_rule_continues() {
    let (tmpdir, _) = create_files_and_tmpdir(&[("a.log", "2023-01-01T00:00:00Z INFO a\n")]);
    let config = ScanConfig {
        rules: vec![TimestampRule::new("(unclosed", "X")],
        ..Default::default()
    };
    let diagnostics = DiagnosticsCollect::new();
    let groups = scan(
        &tmpdir_fpath(&tmpdir),
        &ScanWindow::all(),
        &config,
        &CancelToken::new(),
        &diagnostics,
    )
    .unwrap();
    assert_eq!(groups.len(), 1);
    assert!(matches!(diagnostics.diagnostics()[0], Diagnostic::RuleInvalid(0, _, _)));
}

#[cfg(unix)]
#[test]
fn test_scan_unreadable_file() {
    use std::os::unix::fs::PermissionsExt;

    let (tmpdir, fpaths) = create_files_and_tmpdir(&[
        ("a.log", "2023-01-01T00:00:00Z INFO a\n"),
        ("b.log", "2023-01-01T00:00:01Z INFO b\n"),
    ]);
    std::fs::set_permissions(&fpaths[1], std::fs::Permissions::from_mode(0o000)).unwrap();
    // root ignores permissions
    if std::fs::File::open(&fpaths[1]).is_ok() {
        return;
    }
    let diagnostics = DiagnosticsCollect::new();
    let output = scan_with_summary(
        &tmpdir_fpath(&tmpdir),
        &ScanWindow::all(),
        &ScanConfig::default(),
        &CancelToken::new(),
        &diagnostics,
        &ProgressNull,
    )
    .unwrap();
    assert_eq!(output.entries_count(), 1);
    assert!(matches!(output.summaries[1].result, FileProcessingResult::FileErrOpen(_)));
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| matches!(d, Diagnostic::FileOpenFailed(p, _) if p == &fpaths[1])));
}
