// src/data/logentry.rs

//! Implements [`LogEntry`], a "log message" found within a file, and the
//! severity [`Level`] of a plain log entry.

use crate::common::{EpochMillis, FPath, LineNumber};
use crate::data::datetime::millis_to_rfc3339;

use std::fmt;
use std::str::FromStr;

use ::lazy_static::lazy_static;
use ::regex::Regex;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Level
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity of a plain log entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Sentinel passed as a level name meaning "do not filter by level".
pub const LEVEL_ALL_SENTINEL: &str = "ALL";

lazy_static! {
    /// First case-insensitive whole-word severity in a line.
    static ref LEVEL_REGEX: Regex = {
        match Regex::new(r"(?i)\b(DEBUG|INFO|WARN|ERROR|FATAL)\b") {
            Ok(regex) => regex,
            Err(err) => panic!("LEVEL_REGEX failed to compile {}", err),
        }
    };
}

impl Level {
    /// All levels, least severe first.
    pub const ALL: [Level; 5] = [Level::Debug, Level::Info, Level::Warn, Level::Error, Level::Fatal];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Detect the first case-insensitive whole-word severity in `line`.
    pub fn detect(line: &str) -> Option<Level> {
        let found = LEVEL_REGEX.find(line)?;

        Level::from_str(found.as_str()).ok()
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Level, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            "FATAL" => Ok(Level::Fatal),
            _ => Err(format!("unknown level {:?}", s)),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogEntry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How a [`LogEntry`] was found.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EntryKind {
    /// a single line with a timestamp
    Plain,
    /// a JSON object, possibly spanning many lines
    Json,
}

/// A log message with an extracted timestamp.
///
/// Immutable once created.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LogEntry {
    /// milliseconds since the Unix epoch, UTC
    pub timestamp_millis: EpochMillis,
    /// the line, or the newline-joined lines of a JSON block
    pub raw_text: String,
    pub file_path: FPath,
    /// one-based line number of the first line
    pub line_number: LineNumber,
    /// severity of a `Plain` entry, if detected; always `None` for `Json`
    pub severity: Option<Level>,
    pub kind: EntryKind,
}

impl LogEntry {
    pub fn new_plain(
        timestamp_millis: EpochMillis,
        raw_text: String,
        file_path: FPath,
        line_number: LineNumber,
        severity: Option<Level>,
    ) -> LogEntry {
        LogEntry {
            timestamp_millis,
            raw_text,
            file_path,
            line_number,
            severity,
            kind: EntryKind::Plain,
        }
    }

    pub fn new_json(
        timestamp_millis: EpochMillis,
        raw_text: String,
        file_path: FPath,
        line_number: LineNumber,
    ) -> LogEntry {
        LogEntry {
            timestamp_millis,
            raw_text,
            file_path,
            line_number,
            severity: None,
            kind: EntryKind::Json,
        }
    }

    pub const fn is_json(&self) -> bool {
        matches!(self.kind, EntryKind::Json)
    }

    /// Count of lines in `raw_text`.
    pub fn count_lines(&self) -> usize {
        self.raw_text.lines().count().max(1)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} [{}] {}",
            self.file_path,
            self.line_number,
            millis_to_rfc3339(self.timestamp_millis),
            self.raw_text
        )
    }
}

pub type LogEntries = Vec<LogEntry>;
