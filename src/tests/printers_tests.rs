// src/tests/printers_tests.rs

//! tests for `src/printer/printers.rs` and `src/debug/printers.rs`

#![allow(non_snake_case)]

use crate::common::EpochMillis;
use crate::data::group::{group_entries, Group};
use crate::data::logentry::{Level, LogEntry};
use crate::printer::printers::{
    color_choice_from_str,
    keyword_spans,
    keywords_regex,
    ColorChoice,
    PrinterGroup,
};
use crate::debug::printers::{char_to_char_noraw, str_to_String_noraw};

extern crate si_trace_print;
#[allow(unused_imports)]
use si_trace_print::printers::{defo, defn, defx};

use ::termcolor::{Ansi, NoColor};

extern crate test_case;
use test_case::test_case;

/// 2023-01-01T00:00:00Z
const JAN1: EpochMillis = 1_672_531_200_000;

fn strings(list: &[&str]) -> Vec<String> {
    list.iter()
        .map(|s| s.to_string())
        .collect()
}

fn groups_sample() -> Vec<Group> {
    group_entries(vec![
        LogEntry::new_plain(
            JAN1,
            String::from("2023-01-01T00:00:00Z INFO start"),
            String::from("a.log"),
            1,
            Some(Level::Info),
        ),
        LogEntry::new_plain(
            JAN1 + 5000,
            String::from("2023-01-01T00:00:05Z ERROR boom"),
            String::from("a.log"),
            2,
            Some(Level::Error),
        ),
        LogEntry::new_json(
            JAN1 + 6000,
            String::from("{\n  \"ts\": \"2023-01-01T00:00:06Z\"\n}"),
            String::from("b.log"),
            5,
        ),
    ])
}

fn print_nocolor(
    groups: &[Group],
    keywords: &[&str],
) -> String {
    let mut printer = PrinterGroup::new(NoColor::new(Vec::<u8>::new()), &strings(keywords));
    let printed = match printer.print_groups(groups) {
        Ok(printed) => printed,
        Err(err) => panic!("print_groups failed {}", err),
    };
    assert_eq!(printer.groups_printed(), groups.len());
    let buffer: Vec<u8> = printer.into_inner().into_inner();
    assert_eq!(printed, buffer.len());

    String::from_utf8(buffer).unwrap()
}

#[test]
fn test_PrinterGroup_print_groups() {
    let printed = print_nocolor(&groups_sample(), &[]);
    let expect = "\
==> a.log 2023-01-01T00:00:00.000Z … 2023-01-01T00:00:05.000Z (2)
1: 2023-01-01T00:00:00Z INFO start
2: 2023-01-01T00:00:05Z ERROR boom
==> b.log 2023-01-01T00:00:06.000Z … 2023-01-01T00:00:06.000Z (1)
5: {
6:   \"ts\": \"2023-01-01T00:00:06Z\"
7: }
";
    assert_eq!(printed, expect);
}

#[test]
fn test_PrinterGroup_print_groups_empty() {
    assert_eq!(print_nocolor(&[], &["boom"]), "");
}

#[test]
fn test_PrinterGroup_keywords_nocolor_unchanged() {
    let plain = print_nocolor(&groups_sample(), &[]);
    let highlighted = print_nocolor(&groups_sample(), &["BOOM", "start"]);
    assert_eq!(plain, highlighted);
}

#[test]
fn test_PrinterGroup_keywords_ansi() {
    let groups = groups_sample();
    let mut printer = PrinterGroup::new(Ansi::new(Vec::<u8>::new()), &strings(&["boom"]));
    printer.print_groups(&groups).unwrap();
    let printed = String::from_utf8(printer.into_inner().into_inner()).unwrap();
    // keyword background
    assert!(printed.contains("\x1b[43m"), "{:?}", printed);
    assert!(printed.contains("boom"), "{:?}", printed);
    // output ends reset
    assert!(printed.ends_with("\x1b[0m"), "{:?}", printed);
}

#[test]
fn test_PrinterGroup_no_keywords_ansi_no_highlight() {
    let groups = groups_sample();
    let mut printer = PrinterGroup::new(Ansi::new(Vec::<u8>::new()), &[]);
    printer.print_groups(&groups).unwrap();
    let printed = String::from_utf8(printer.into_inner().into_inner()).unwrap();
    assert!(!printed.contains("\x1b[43m"), "{:?}", printed);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test_case(&["error"], "x ERROR y Error", &[(2, 7), (10, 15)]; "case insensitive")]
#[test_case(&["a.b"], "a.b axb", &[(0, 3)]; "literal not regex")]
#[test_case(&["foo", "bar"], "bar foo", &[(0, 3), (4, 7)]; "many")]
#[test_case(&["zzz"], "abc", &[]; "no match")]
fn test_keyword_spans(
    keywords: &[&str],
    text: &str,
    expect: &[(usize, usize)],
) {
    let regex = match keywords_regex(&strings(keywords)) {
        Some(regex) => regex,
        None => panic!("keywords_regex({:?}) returned None", keywords),
    };
    assert_eq!(keyword_spans(&regex, text), expect.to_vec());
}

#[test]
fn test_keywords_regex_none() {
    assert!(keywords_regex(&[]).is_none());
    assert!(keywords_regex(&strings(&[""])).is_none());
}

#[test_case("always", Some(ColorChoice::Always))]
#[test_case("auto", Some(ColorChoice::Auto))]
#[test_case("never", Some(ColorChoice::Never))]
#[test_case("sometimes", None)]
fn test_color_choice_from_str(
    value: &str,
    expect: Option<ColorChoice>,
) {
    assert_eq!(color_choice_from_str(value), expect);
}

#[test_case('\0', '␀'; "nul")]
#[test_case('\t', '␉'; "tab")]
#[test_case('\n', '␊'; "newline")]
#[test_case('\r', '␍'; "carriage return")]
#[test_case('\x1b', '␛'; "escape")]
#[test_case('\x1f', '␟'; "unit separator")]
#[test_case('\x7f', '␡'; "delete")]
#[test_case(' ', ' '; "space")]
#[test_case('é', 'é'; "non-ascii")]
fn test_char_to_char_noraw(
    c: char,
    expect: char,
) {
    assert_eq!(char_to_char_noraw(c), expect);
}

#[test]
fn test_str_to_String_noraw() {
    assert_eq!(str_to_String_noraw("a\tb\r\n"), "a␉b␍␊");
}
