// src/readers/summary.rs

//! Implements `Summary` statistics tracking struct.

use crate::common::{Count, EpochMillis, FPath};
use crate::readers::entryfilter::Result_Filter_Entry;

use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FileProcessingResult
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How processing of one file ended.
///
/// Errors are stored as `String` so this is `Clone`; the error was already
/// reported as a [`Diagnostic`].
///
/// [`Diagnostic`]: crate::data::diagnostic::Diagnostic
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum FileProcessingResult {
    /// processing did not start, the scan was cancelled first
    #[default]
    FileNotStarted,
    /// the whole file was processed
    FileOk,
    /// processing stopped partway due to cancellation
    FileCancelled,
    /// the file could not be opened
    FileErrOpen(String),
    /// a read error occurred partway; entries before the error are kept
    FileErrRead(String),
}

impl FileProcessingResult {
    pub const fn is_ok(&self) -> bool {
        matches!(self, FileProcessingResult::FileOk)
    }

    pub const fn is_err(&self) -> bool {
        matches!(self, FileProcessingResult::FileErrOpen(_) | FileProcessingResult::FileErrRead(_))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Summary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Statistics gathered by an [`EntryParser`] about one file.
///
/// [`EntryParser`]: crate::readers::entryparser::EntryParser
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SummaryEntryParser {
    pub lines_read: Count,
    pub bytes_read: Count,
    pub blocks_read: Count,
    /// plain lines with a timestamp
    pub plain_candidates: Count,
    /// lines without a timestamp, outside of JSON blocks
    pub plain_no_timestamp: Count,
    /// JSON blocks begun
    pub json_blocks: Count,
    /// JSON blocks that parsed and had a timestamp
    pub json_candidates: Count,
    /// JSON blocks that did not parse, had no timestamp, or never closed
    pub json_dropped: Count,
}

impl SummaryEntryParser {
    pub const fn candidates(&self) -> Count {
        self.plain_candidates + self.json_candidates
    }
}

/// Accumulated statistics about processing of a single file.
///
/// For CLI option `--summary`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    pub path: FPath,
    pub result: FileProcessingResult,
    pub parser: SummaryEntryParser,
    /// candidates that passed the filters
    pub accepted: Count,
    pub rejected_before: Count,
    pub rejected_after: Count,
    pub rejected_level: Count,
    /// earliest accepted timestamp
    pub ts_first_accepted: Option<EpochMillis>,
    /// latest accepted timestamp
    pub ts_last_accepted: Option<EpochMillis>,
}

impl Summary {
    pub fn new(path: FPath) -> Summary {
        Summary {
            path,
            ..Default::default()
        }
    }

    /// Update statistics with one filtered candidate.
    pub fn update_filter(
        &mut self,
        result: Result_Filter_Entry,
        timestamp_millis: EpochMillis,
    ) {
        match result {
            Result_Filter_Entry::Pass => {
                self.accepted += 1;
                self.ts_first_accepted = Some(match self.ts_first_accepted {
                    Some(ts) => ts.min(timestamp_millis),
                    None => timestamp_millis,
                });
                self.ts_last_accepted = Some(match self.ts_last_accepted {
                    Some(ts) => ts.max(timestamp_millis),
                    None => timestamp_millis,
                });
            }
            Result_Filter_Entry::FailBefore => self.rejected_before += 1,
            Result_Filter_Entry::FailAfter => self.rejected_after += 1,
            Result_Filter_Entry::FailLevel => self.rejected_level += 1,
        }
    }

    pub const fn rejected(&self) -> Count {
        self.rejected_before + self.rejected_after + self.rejected_level
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {:?} lines {} bytes {} candidates {} (plain {}, json {}) json dropped {} accepted {} rejected {} (before {}, after {}, level {})",
            self.path,
            self.result,
            self.parser.lines_read,
            self.parser.bytes_read,
            self.parser.candidates(),
            self.parser.plain_candidates,
            self.parser.json_candidates,
            self.parser.json_dropped,
            self.accepted,
            self.rejected(),
            self.rejected_before,
            self.rejected_after,
            self.rejected_level,
        )
    }
}

pub type Summaries = Vec<Summary>;
