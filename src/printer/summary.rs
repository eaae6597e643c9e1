// src/printer/summary.rs

//! Printing of the `--summary` statistics for a [`ScanOutput`].
//!
//! [`ScanOutput`]: crate::readers::scanner::ScanOutput

use crate::data::datetime::millis_to_rfc3339;
use crate::debug::printers::de_err;
use crate::readers::scanner::ScanOutput;
use crate::readers::summary::{FileProcessingResult, Summary};

use std::io::{Result, Write};

/// For printing `--summary` lines, indentation.
pub const OPT_SUMMARY_PRINT_INDENT1: &str = "  ";
/// For printing `--summary` lines, indentation.
pub const OPT_SUMMARY_PRINT_INDENT2: &str = "      ";

fn write_file_result<W: Write>(
    out: &mut W,
    result: &FileProcessingResult,
) -> Result<()> {
    let indent1 = OPT_SUMMARY_PRINT_INDENT1;
    match result {
        FileProcessingResult::FileNotStarted => writeln!(out, "{}Result: not started", indent1),
        FileProcessingResult::FileOk => writeln!(out, "{}Result: ok", indent1),
        FileProcessingResult::FileCancelled => writeln!(out, "{}Result: cancelled", indent1),
        FileProcessingResult::FileErrOpen(err) => writeln!(out, "{}Result: open failed: {}", indent1, err),
        FileProcessingResult::FileErrRead(err) => writeln!(out, "{}Result: read failed: {}", indent1, err),
    }
}

/// Print the statistics of one file.
pub fn write_summary<W: Write>(
    out: &mut W,
    summary: &Summary,
) -> Result<()> {
    let indent1 = OPT_SUMMARY_PRINT_INDENT1;
    let indent2 = OPT_SUMMARY_PRINT_INDENT2;
    writeln!(out, "File: {}", summary.path)?;
    write_file_result(out, &summary.result)?;
    if matches!(summary.result, FileProcessingResult::FileNotStarted | FileProcessingResult::FileErrOpen(_)) {
        return Ok(());
    }
    writeln!(out, "{}Processed:", indent1)?;
    writeln!(out, "{}bytes         : {}", indent2, summary.parser.bytes_read)?;
    writeln!(out, "{}blocks        : {}", indent2, summary.parser.blocks_read)?;
    writeln!(out, "{}lines         : {}", indent2, summary.parser.lines_read)?;
    writeln!(out, "{}candidates    : {}", indent2, summary.parser.candidates())?;
    writeln!(out, "{}  plain       : {}", indent2, summary.parser.plain_candidates)?;
    writeln!(out, "{}  JSON        : {}", indent2, summary.parser.json_candidates)?;
    writeln!(out, "{}JSON blocks   : {}", indent2, summary.parser.json_blocks)?;
    writeln!(out, "{}JSON dropped  : {}", indent2, summary.parser.json_dropped)?;
    writeln!(out, "{}Filtered:", indent1)?;
    writeln!(out, "{}accepted      : {}", indent2, summary.accepted)?;
    writeln!(out, "{}before window : {}", indent2, summary.rejected_before)?;
    writeln!(out, "{}after window  : {}", indent2, summary.rejected_after)?;
    writeln!(out, "{}level         : {}", indent2, summary.rejected_level)?;
    if let (Some(first), Some(last)) = (summary.ts_first_accepted, summary.ts_last_accepted) {
        writeln!(out, "{}first accepted: {}", indent2, millis_to_rfc3339(first))?;
        writeln!(out, "{}last accepted : {}", indent2, millis_to_rfc3339(last))?;
    }

    Ok(())
}

/// Print the statistics of all files and the scan totals.
pub fn write_summaries<W: Write>(
    out: &mut W,
    output: &ScanOutput,
    diagnostics_count: usize,
) -> Result<()> {
    writeln!(out)?;
    for summary in output.summaries.iter() {
        write_summary(out, summary)?;
        writeln!(out)?;
    }
    let entries: usize = output.entries_count();
    let files_err: usize = output
        .summaries
        .iter()
        .filter(|summary| summary.result.is_err())
        .count();
    writeln!(out, "Files       : {}", output.files_total)?;
    writeln!(out, "Files failed: {}", files_err)?;
    writeln!(out, "Groups      : {}", output.groups.len())?;
    writeln!(out, "Entries     : {}", entries)?;
    writeln!(out, "Diagnostics : {}", diagnostics_count)?;
    writeln!(out, "Cancelled   : {}", output.cancelled)?;

    Ok(())
}

/// Print the statistics to stderr.
pub fn print_summaries(
    output: &ScanOutput,
    diagnostics_count: usize,
) {
    let mut stderr_lock = std::io::stderr().lock();
    if let Err(_err) = write_summaries(&mut stderr_lock, output, diagnostics_count) {
        de_err!("write_summaries failed {}", _err);
    }
}
