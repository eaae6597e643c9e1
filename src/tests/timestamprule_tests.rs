// src/tests/timestamprule_tests.rs

//! tests for `timestamprule.rs`

#![allow(non_snake_case)]

use crate::common::EpochMillis;
use crate::data::datetime::TimestampFormat;
use crate::data::diagnostic::{Diagnostic, DiagnosticsCollect, DiagnosticsNull};
use crate::data::timestamprule::{
    compile_rules,
    extract_timestamp,
    CompiledMatcher,
    TimestampRule,
};

extern crate si_trace_print;
use si_trace_print::stack::stack_offset_set;

extern crate test_case;
use test_case::test_case;

/// 2023-01-01T00:00:00Z
const JAN1: EpochMillis = 1_672_531_200_000;

#[test]
fn test_compile_rules_empty_has_fallback() {
    let matchers = compile_rules(&[], &DiagnosticsNull);
    assert_eq!(matchers.len(), 1);
    assert_eq!(matchers[0].format(), &TimestampFormat::Iso8601);
}

#[test]
fn test_compile_rules_fallback_last() {
    let rules = vec![
        TimestampRule::new(r"^\d+", "X"),
        TimestampRule::new(r"\d{2}:\d{2}:\d{2}", "HH:mm:ss"),
    ];
    let matchers = compile_rules(&rules, &DiagnosticsNull);
    assert_eq!(matchers.len(), 3);
    assert_eq!(matchers[0].format(), &TimestampFormat::EpochSeconds);
    assert_eq!(matchers[0].regex_str(), r"^\d+");
    assert!(matches!(matchers[1].format(), TimestampFormat::Structured(_)));
    assert_eq!(matchers[2].format(), &TimestampFormat::Iso8601);
}

#[test]
fn test_compile_rules_bad_regex_skipped() {
    stack_offset_set(Some(2));
    let rules = vec![
        TimestampRule::new(r"([0-9", "X"),
        TimestampRule::new(r"^\d+", "X"),
    ];
    let diagnostics = DiagnosticsCollect::new();
    let matchers = compile_rules(&rules, &diagnostics);
    assert_eq!(matchers.len(), 2, "bad rule not skipped");
    assert_eq!(matchers[0].regex_str(), r"^\d+");
    let diags = diagnostics.diagnostics();
    assert_eq!(diags.len(), 1, "{:?}", diags);
    match &diags[0] {
        Diagnostic::RuleInvalid(index, expression, _err) => {
            assert_eq!(*index, 0);
            assert_eq!(expression, r"([0-9");
        }
        diag => panic!("unexpected {:?}", diag),
    }
}

#[test]
fn test_compile_rules_bad_format_skipped() {
    let rules = vec![
        TimestampRule::new(r"^\d+", "X"),
        TimestampRule::new(r"\S+", "yyyy 'oops"),
    ];
    let diagnostics = DiagnosticsCollect::new();
    let matchers = compile_rules(&rules, &diagnostics);
    assert_eq!(matchers.len(), 2);
    let diags = diagnostics.diagnostics();
    assert_eq!(diags.len(), 1, "{:?}", diags);
    assert!(
        matches!(&diags[0], Diagnostic::FormatInvalid(1, format, _) if format == "yyyy 'oops"),
        "{:?}",
        diags[0]
    );
}

#[test]
fn test_CompiledMatcher_capture_group() {
    let rules = vec![TimestampRule::new(r"ts=(\d+) ", "X")];
    let matchers = compile_rules(&rules, &DiagnosticsNull);
    assert_eq!(matchers[0].extract("id=99 ts=1672531200 hello"), Some(JAN1));
    assert_eq!(matchers[0].extract("id=99 hello"), None);
}

#[test]
fn test_CompiledMatcher_whole_match() {
    let rules = vec![TimestampRule::new(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}", "yyyy-MM-dd HH:mm:ss")];
    let matchers = compile_rules(&rules, &DiagnosticsNull);
    assert_eq!(matchers[0].extract("[2023-01-01 00:00:05] INFO go"), Some(JAN1 + 5000));
}

#[test]
fn test_CompiledMatcher_iso8601_fallback() {
    let matcher = CompiledMatcher::iso8601_fallback();
    assert_eq!(matcher.extract("2023-01-01T00:00:00Z INFO start"), Some(JAN1));
    assert_eq!(matcher.extract("at 2023-01-01T00:00:01.5Z done"), Some(JAN1 + 1500));
    assert_eq!(matcher.extract("2023-01-01T02:00:00+02:00 x"), Some(JAN1));
    assert_eq!(matcher.extract("no timestamp here"), None);
}

#[test_case("1672531200 INFO started", Some(JAN1); "first rule")]
#[test_case("10:00:00 INFO started", Some(36_000_000); "second rule")]
#[test_case("2023-01-01T00:00:07Z INFO started", Some(JAN1 + 7000); "fallback")]
#[test_case("INFO started", None; "no rule")]
fn test_extract_timestamp_priority(
    line: &str,
    expect: Option<EpochMillis>,
) {
    stack_offset_set(Some(2));
    let rules = vec![
        TimestampRule::new(r"^\d{10}\b", "X"),
        TimestampRule::new(r"^\d{2}:\d{2}:\d{2}", "HH:mm:ss"),
    ];
    let matchers = compile_rules(&rules, &DiagnosticsNull);
    assert_eq!(extract_timestamp(&matchers, line), expect, "line {:?}", line);
}

/// a rule whose regex matches but whose text is not a valid instant does
/// not stop later rules
#[test]
fn test_extract_timestamp_invalid_instant_falls_through() {
    let rules = vec![
        TimestampRule::new(r"^(\S+)", "yyyy-MM-dd"),
        TimestampRule::new(r"at (\d+)", "X"),
    ];
    let matchers = compile_rules(&rules, &DiagnosticsNull);
    assert_eq!(extract_timestamp(&matchers, "2023-99-99 at 1672531200"), Some(JAN1));
}

#[test]
fn test_extract_timestamp_first_match_wins() {
    let rules = vec![
        TimestampRule::new(r"a=(\d+)", "X"),
        TimestampRule::new(r"b=(\d+)", "X"),
    ];
    let matchers = compile_rules(&rules, &DiagnosticsNull);
    assert_eq!(extract_timestamp(&matchers, "b=1 a=2"), Some(2000));
}
