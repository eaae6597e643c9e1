// src/readers/entryparser.rs

//! Implements an [`EntryParser`], the two-mode state machine deriving
//! candidate [`LogEntry`]s from lines of one file, and [`parse_file`], the
//! driver of an `EntryParser` over a [`LineReader`].
//!
//! In "line" mode each line is a candidate plain entry if a
//! [`CompiledMatcher`] finds a timestamp within it.
//! A line beginning with `{` (after leading whitespace) enters "accumulating"
//! mode. Lines are then accumulated until the braces balance, and the
//! accumulated text is parsed as a JSON object. While accumulating, lines are
//! never evaluated as plain entries.
//!
//! [`LogEntry`]: crate::data::logentry::LogEntry
//! [`LineReader`]: crate::readers::linereader::LineReader
//! [`CompiledMatcher`]: crate::data::timestamprule::CompiledMatcher

use crate::common::{debug_panic, EpochMillis, FPath, FileOpenOptions, LineNumber, ResultS3};
use crate::data::datetime::parse_iso8601_millis;
use crate::data::diagnostic::{Diagnostic, DiagnosticSink};
use crate::data::logentry::{Level, LogEntry};
use crate::data::timestamprule::{extract_timestamp, CompiledMatcher};
use crate::readers::cancel::CancelToken;
use crate::readers::linereader::{BlockSz, LineReader};
use crate::readers::summary::SummaryEntryParser;

use std::fmt;
use std::io::Read;

use ::memchr::memchr_iter;
use ::serde_json::Value;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Net count of `{` minus `}` in `line`.
///
/// Braces within JSON strings are counted too.
#[inline(always)]
pub fn brace_balance(line: &str) -> i64 {
    let bytes = line.as_bytes();
    let opens = memchr_iter(b'{', bytes).count() as i64;
    let closes = memchr_iter(b'}', bytes).count() as i64;

    opens - closes
}

/// Does `line` begin a JSON block?
#[inline(always)]
pub fn is_json_trigger(line: &str) -> bool {
    line.trim_start().starts_with('{')
}

/// Failure to derive a timestamp from a complete JSON block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JsonTimestampError {
    /// not valid JSON; the `serde_json` error message
    Parse(String),
    /// valid JSON but not an object, or no field held a valid timestamp
    NoTimestamp,
}

/// Parse `text` as JSON and find the first of `fields`, in order, that is a
/// top-level string member holding a valid ISO-8601 instant.
pub fn json_timestamp(
    text: &str,
    fields: &[String],
) -> Result<EpochMillis, JsonTimestampError> {
    let value: Value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(err) => return Err(JsonTimestampError::Parse(err.to_string())),
    };
    let object = match value.as_object() {
        Some(object) => object,
        None => return Err(JsonTimestampError::NoTimestamp),
    };
    fields
        .iter()
        .filter_map(|field| object.get(field.as_str()))
        .filter_map(|value| value.as_str())
        .find_map(parse_iso8601_millis)
        .ok_or(JsonTimestampError::NoTimestamp)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EntryParser
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Mode of an [`EntryParser`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ParserState {
    /// each line is evaluated as a plain entry
    #[default]
    Line,
    /// within a JSON block
    Accumulating {
        /// newline-joined lines of the block
        buffer: String,
        /// net count of `{` minus `}` so far
        brace_count: i64,
        /// line number of the opening line
        line_start: LineNumber,
    },
}

/// Derives candidate [`LogEntry`]s from the lines of one file, in order.
///
/// Holds at most one JSON block in memory.
pub struct EntryParser<'a> {
    path: FPath,
    matchers: &'a [CompiledMatcher],
    timestamp_fields: &'a [String],
    state: ParserState,
    summary: SummaryEntryParser,
}

impl fmt::Debug for EntryParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EntryParser")
            .field("path", &self.path)
            .field("matchers", &self.matchers.len())
            .field("timestamp_fields", &self.timestamp_fields)
            .field("state", &self.state)
            .finish()
    }
}

impl<'a> EntryParser<'a> {
    pub fn new(
        path: FPath,
        matchers: &'a [CompiledMatcher],
        timestamp_fields: &'a [String],
    ) -> EntryParser<'a> {
        defñ!("({:?}, {} matchers)", path, matchers.len());

        EntryParser {
            path,
            matchers,
            timestamp_fields,
            state: ParserState::Line,
            summary: SummaryEntryParser::default(),
        }
    }

    pub fn path(&self) -> &FPath {
        &self.path
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub const fn is_accumulating(&self) -> bool {
        matches!(self.state, ParserState::Accumulating { .. })
    }

    pub fn summary(&self) -> SummaryEntryParser {
        self.summary
    }

    /// Process the next line. Returns a candidate if one was completed.
    ///
    /// `line_number` is one-based and must increase with each call.
    pub fn process_line(
        &mut self,
        line_number: LineNumber,
        line: &str,
        diagnostics: &dyn DiagnosticSink,
    ) -> Option<LogEntry> {
        if let ParserState::Accumulating {
            buffer,
            brace_count,
            line_start: _,
        } = &mut self.state
        {
            buffer.push('\n');
            buffer.push_str(line);
            *brace_count += brace_balance(line);
            if *brace_count == 0 {
                return self.complete_json(diagnostics);
            }
            return None;
        }
        if !is_json_trigger(line) {
            return self.process_plain(line_number, line);
        }
        self.summary.json_blocks += 1;
        // the opening `{` plus any further braces on the opening line
        let brace_count = brace_balance(line);
        defo!("line {} begins JSON block, brace count {}", line_number, brace_count);
        self.state = ParserState::Accumulating {
            buffer: String::from(line),
            brace_count,
            line_start: line_number,
        };
        if brace_count == 0 {
            return self.complete_json(diagnostics);
        }

        None
    }

    fn process_plain(
        &mut self,
        line_number: LineNumber,
        line: &str,
    ) -> Option<LogEntry> {
        let timestamp_millis = match extract_timestamp(self.matchers, line) {
            Some(ts) => ts,
            None => {
                self.summary.plain_no_timestamp += 1;
                return None;
            }
        };
        self.summary.plain_candidates += 1;

        Some(LogEntry::new_plain(
            timestamp_millis,
            line.to_string(),
            self.path.clone(),
            line_number,
            Level::detect(line),
        ))
    }

    /// The braces of the JSON block balanced; return to line mode and try
    /// the block.
    fn complete_json(
        &mut self,
        diagnostics: &dyn DiagnosticSink,
    ) -> Option<LogEntry> {
        let (buffer, line_start) = match std::mem::take(&mut self.state) {
            ParserState::Accumulating {
                buffer,
                brace_count: _,
                line_start,
            } => (buffer, line_start),
            ParserState::Line => {
                debug_panic!("complete_json called in line mode for {:?}", self.path);
                return None;
            }
        };
        match json_timestamp(buffer.as_str(), self.timestamp_fields) {
            Ok(timestamp_millis) => {
                defo!("JSON block at line {} timestamp {}", line_start, timestamp_millis);
                self.summary.json_candidates += 1;
                Some(LogEntry::new_json(timestamp_millis, buffer, self.path.clone(), line_start))
            }
            Err(JsonTimestampError::Parse(err)) => {
                self.summary.json_dropped += 1;
                diagnostics.diagnostic(Diagnostic::JsonParseFailed(self.path.clone(), line_start, err));
                None
            }
            Err(JsonTimestampError::NoTimestamp) => {
                self.summary.json_dropped += 1;
                diagnostics.diagnostic(Diagnostic::JsonNoTimestamp(self.path.clone(), line_start));
                None
            }
        }
    }

    /// End of data. An unterminated JSON block is discarded without parsing.
    pub fn finish(
        &mut self,
        diagnostics: &dyn DiagnosticSink,
    ) {
        if let ParserState::Accumulating { line_start, .. } = std::mem::take(&mut self.state) {
            defo!("unterminated JSON block at line {}", line_start);
            self.summary.json_dropped += 1;
            diagnostics.diagnostic(Diagnostic::JsonUnterminated(self.path.clone(), line_start));
        }
    }

    /// Cancelled. Any JSON block in progress is discarded silently.
    pub fn abort(&mut self) {
        if self.is_accumulating() {
            self.summary.json_dropped += 1;
        }
        self.state = ParserState::Line;
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// driver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How [`parse_reader`] or [`parse_file`] ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseResult {
    /// all data was processed
    Done,
    /// cancellation was noticed at a line boundary
    Cancelled,
    /// the file could not be opened; nothing was processed
    ErrOpen(String),
    /// a read error occurred; lines before the error were processed
    ErrRead(String),
}

/// Run an [`EntryParser`] over all lines of `reader`, passing each candidate
/// to `on_entry`.
///
/// `cancel` is checked before each line.
#[allow(clippy::too_many_arguments)]
pub fn parse_reader<R, F>(
    reader: R,
    path: &FPath,
    blocksz: BlockSz,
    matchers: &[CompiledMatcher],
    timestamp_fields: &[String],
    cancel: &CancelToken,
    diagnostics: &dyn DiagnosticSink,
    mut on_entry: F,
) -> (ParseResult, SummaryEntryParser)
where
    R: Read,
    F: FnMut(LogEntry),
{
    defn!("({:?}, {})", path, blocksz);
    let mut linereader = LineReader::new(reader, path.clone(), blocksz);
    let mut parser = EntryParser::new(path.clone(), matchers, timestamp_fields);
    let result: ParseResult = loop {
        if cancel.is_cancelled() {
            defo!("cancelled {:?}", path);
            parser.abort();
            break ParseResult::Cancelled;
        }
        match linereader.next_line() {
            ResultS3::Found((line_number, line)) => {
                if let Some(entry) = parser.process_line(line_number, line.as_str(), diagnostics) {
                    on_entry(entry);
                }
            }
            ResultS3::Done => {
                parser.finish(diagnostics);
                break ParseResult::Done;
            }
            ResultS3::Err(err) => {
                parser.abort();
                diagnostics.diagnostic(Diagnostic::FileReadFailed(path.clone(), err.to_string()));
                break ParseResult::ErrRead(err.to_string());
            }
        }
    };
    let mut summary: SummaryEntryParser = parser.summary();
    summary.lines_read = linereader.lines_read();
    summary.bytes_read = linereader.bytes_read();
    summary.blocks_read = linereader.blocks_read();
    defx!("{:?} {:?}", path, result);

    (result, summary)
}

/// Open the file at `path` and run [`parse_reader`] over it.
pub fn parse_file<F>(
    path: &FPath,
    blocksz: BlockSz,
    matchers: &[CompiledMatcher],
    timestamp_fields: &[String],
    cancel: &CancelToken,
    diagnostics: &dyn DiagnosticSink,
    on_entry: F,
) -> (ParseResult, SummaryEntryParser)
where
    F: FnMut(LogEntry),
{
    let file = match FileOpenOptions::new().read(true).open(path.as_str()) {
        Ok(file) => file,
        Err(err) => {
            defñ!("open failed {:?} {}", path, err);
            diagnostics.diagnostic(Diagnostic::FileOpenFailed(path.clone(), err.to_string()));
            return (ParseResult::ErrOpen(err.to_string()), SummaryEntryParser::default());
        }
    };

    parse_reader(file, path, blocksz, matchers, timestamp_fields, cancel, diagnostics, on_entry)
}

/// Parse all of `path`, gathering every candidate, ignoring cancellation.
///
/// Convenience for callers with one file.
pub fn parse_file_entries(
    path: &FPath,
    blocksz: BlockSz,
    matchers: &[CompiledMatcher],
    timestamp_fields: &[String],
    diagnostics: &dyn DiagnosticSink,
) -> (Vec<LogEntry>, ParseResult) {
    let mut entries = Vec::<LogEntry>::new();
    let cancel = CancelToken::new();
    let (result, _summary) = parse_file(
        path,
        blocksz,
        matchers,
        timestamp_fields,
        &cancel,
        diagnostics,
        |entry| entries.push(entry),
    );

    (entries, result)
}
