// src/bin/lws.rs

//! Driver program _lws_ drives the [_lwslib_].
//!
//! Processes user-passed command-line arguments into a [`ScanWindow`] and a
//! [`ScanConfig`], then runs one [`scan_with_summary`] of the passed
//! directory.
//!
//! The resulting [`Group`s] are printed to stdout by a [`PrinterGroup`].
//! Diagnostics about anything skipped are printed to stderr.
//!
//! If passed CLI option `--summary`, a [`Summary`] about each file
//! processed is printed to stderr.
//!
//! A Ctrl+C stops the scan; whatever was gathered is still printed.
//!
//! [_lwslib_]: lwslib
//! [`ScanWindow`]: lwslib::data::datetime::ScanWindow
//! [`ScanConfig`]: lwslib::readers::scanner::ScanConfig
//! [`scan_with_summary`]: lwslib::readers::scanner::scan_with_summary
//! [`Group`s]: lwslib::data::group::Group
//! [`PrinterGroup`]: lwslib::printer::printers::PrinterGroup
//! [`Summary`]: lwslib::readers::summary::Summary

#![allow(non_camel_case_types)]

cfg_if::cfg_if! {
    if #[cfg(feature = "jemalloc")] {
        use ::tikv_jemallocator::Jemalloc;
        #[global_allocator]
        static GLOBAL: Jemalloc = Jemalloc;
        const CLI_HELP_AFTER_ALLOCATOR: &str = "jemalloc";
    }
    else if #[cfg(feature = "mimalloc")] {
        use ::mimalloc::MiMalloc;
        #[global_allocator]
        static GLOBAL: MiMalloc = MiMalloc;
        const CLI_HELP_AFTER_ALLOCATOR: &str = "mimalloc";
    }
    else {
        const CLI_HELP_AFTER_ALLOCATOR: &str = "system";
    }
}

use std::process::ExitCode;
use std::thread;
use std::time::Instant;

use ::anyhow::{anyhow, Context};
use ::clap::{ArgAction, Parser, ValueEnum};
use ::const_format::concatcp;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, stack::stack_offset_set};

use ::lwslib::common::{EpochMillis, FPath};
#[allow(unused_imports)]
use ::lwslib::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use ::lwslib::data::datetime::{millis_to_rfc3339, parse_window_bound, ScanWindow};
use ::lwslib::data::diagnostic::{Diagnostic, DiagnosticSink, DiagnosticsCollect, DiagnosticsStderr};
use ::lwslib::data::logentry::LEVEL_ALL_SENTINEL;
use ::lwslib::data::timestamprule::{TimestampRule, TimestampRules};
use ::lwslib::printer::printers::{print_colored_stderr, ColorChoice, PrinterGroup, COLOR_ERROR};
use ::lwslib::printer::summary::print_summaries;
use ::lwslib::readers::cancel::CancelToken;
use ::lwslib::readers::entryfilter::LevelFilter;
use ::lwslib::readers::filepreprocessor::GLOB_INCLUDE_DEFAULT;
use ::lwslib::readers::linereader::{BlockSz, BLOCKSZ_DEF, BLOCKSZ_MAX, BLOCKSZ_MIN};
use ::lwslib::readers::scanner::{
    scan_with_summary,
    ProgressNull,
    ScanConfig,
    ScanOutput,
    TIMESTAMP_FIELDS_DEF,
    WORKERS_DEF,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// command-line parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.ColorChoice.html
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

const CLI_HELP_AFTER: &str = "\
A window bound may be RFC 3339 \"2023-01-01T00:00:00Z\", \"2023-01-01 00:00:00\",
a date \"2023-01-01\", or epoch seconds \"@1672531200\". All are UTC.
Without --after the window is unbounded before; without --before it is
unbounded after.

A timestamp rule is a regular expression and a format. If the regular
expression has a capture group then the first capture group is the timestamp.
The format is \"X\" for epoch seconds, \"x\" for epoch milliseconds, a date-token
string like \"yyyy-MM-dd HH:mm:ss.SSS\", or a strftime string like \"%d/%b/%Y\".
Rules are tried in order; an ISO-8601 rule is always tried last.

A line beginning with \"{\" begins a JSON object which may span many lines.
The timestamp of a JSON object is the first of the --json-field members that
holds an ISO-8601 string.

Glob patterns are matched against the path relative to ROOT. \"*\" does not
match \"/\"; \"**\" does.

Entries are printed sorted by timestamp, in groups of consecutive entries
from the same file.";

// See
// * docs <https://docs.rs/clap/latest/clap/_derive/index.html#command-attributes>
// * inference types <https://github.com/clap-rs/clap/blob/v3.1.6/examples/derive_ref/README.md#arg-types>
//
// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "lws",
    // write expanded information for the `--version` output
    version = concatcp!(
        "(Log Window Scanner)\n",
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "Allocator: ", CLI_HELP_AFTER_ALLOCATOR , "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Directory to scan. Subdirectories are recursed.
    /// Symlinks are followed.
    #[clap(
        required = true,
        verbatim_doc_comment,
    )]
    root: String,

    /// Window start: accept entries with a timestamp at or after this
    /// datetime.
    #[clap(
        short = 'a',
        long = "after",
        verbatim_doc_comment,
        value_parser = cli_parse_window_bound,
    )]
    after: Option<EpochMillis>,

    /// Window end: accept entries with a timestamp at or before this
    /// datetime.
    #[clap(
        short = 'b',
        long = "before",
        verbatim_doc_comment,
        value_parser = cli_parse_window_bound,
    )]
    before: Option<EpochMillis>,

    /// A timestamp rule, a regular expression and a format.
    /// May be passed many times; earlier rules have priority.
    #[clap(
        short = 'r',
        long = "rule",
        verbatim_doc_comment,
        num_args = 2,
        value_names = ["REGEX", "FORMAT"],
        action = ArgAction::Append,
    )]
    rules: Vec<String>,

    /// Accept plain entries with this severity level.
    /// One of DEBUG, INFO, WARN, ERROR, FATAL, or ALL.
    /// May be passed many times. ALL also accepts entries without a level.
    #[clap(
        short = 'l',
        long = "level",
        verbatim_doc_comment,
        action = ArgAction::Append,
        default_values_t = [String::from(LEVEL_ALL_SENTINEL)],
    )]
    levels: Vec<String>,

    /// Only scan files with a path matching this glob.
    /// May be passed many times.
    #[clap(
        short = 'i',
        long = "include",
        verbatim_doc_comment,
        action = ArgAction::Append,
        default_values_t = [String::from(GLOB_INCLUDE_DEFAULT)],
    )]
    include: Vec<String>,

    /// Do not scan files with a path matching this glob.
    /// May be passed many times.
    #[clap(
        short = 'x',
        long = "exclude",
        verbatim_doc_comment,
        action = ArgAction::Append,
    )]
    exclude: Vec<String>,

    /// JSON object member names searched for a timestamp, in order.
    /// May be passed many times. Replaces the default names.
    #[clap(
        short = 'j',
        long = "json-field",
        verbatim_doc_comment,
        action = ArgAction::Append,
        default_values_t = TIMESTAMP_FIELDS_DEF.map(String::from),
    )]
    json_fields: Vec<String>,

    /// Highlight this keyword in printed entries. Case-insensitive.
    /// May be passed many times.
    #[clap(
        short = 'k',
        long = "keyword",
        verbatim_doc_comment,
        action = ArgAction::Append,
    )]
    keywords: Vec<String>,

    /// Count of files processed at the same time.
    #[clap(
        short = 'w',
        long,
        verbatim_doc_comment,
        default_value_t = WORKERS_DEF,
        value_parser = cli_parse_workers,
    )]
    workers: usize,

    /// Read blocks of this size in bytes.
    /// May pass value as any radix (hexadecimal, decimal, octal, binary).
    /// Using the default value is recommended.
    /// Most useful for developers.
    #[clap(
        required = false,
        long,
        verbatim_doc_comment,
        default_value_t = BLOCKSZ_DEF.to_string(),
        value_parser = cli_parse_blocksz,
    )]
    blocksz: String,

    /// Read directories in parallel.
    #[clap(
        long = "parallel-walk",
        verbatim_doc_comment,
    )]
    parallel_walk: bool,

    /// Choose to print using colors.
    #[clap(
        required = false,
        short = 'c',
        long = "color",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Color_Choice::auto,
    )]
    color_choice: CLI_Color_Choice,

    /// Print a summary of files processed to stderr.
    /// Most useful for developers.
    #[clap(
        short,
        long,
        verbatim_doc_comment,
    )]
    summary: bool,
}

/// `clap` argument processor for `--after` and `--before`.
fn cli_parse_window_bound(value: &str) -> std::result::Result<EpochMillis, String> {
    match parse_window_bound(value) {
        Some(millis) => Ok(millis),
        None => Err(format!("Unable to parse a datetime from {:?}", value)),
    }
}

/// `clap` argument processor for `--workers`.
fn cli_parse_workers(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err(String::from("--workers must be at least 1")),
        Ok(workers) => Ok(workers),
        Err(err) => Err(format!("Unable to parse a number for --workers {:?} {}", value, err)),
    }
}

/// `clap` argument processor for `--blocksz`.
fn cli_process_blocksz(blockszs: &String) -> std::result::Result<BlockSz, String> {
    let errs = format!("Unable to parse a number for --blocksz {:?}", blockszs);
    let (digits, radix): (&str, u32) = if let Some(digits) = blockszs.strip_prefix("0x") {
        (digits, 16)
    } else if let Some(digits) = blockszs.strip_prefix("0o") {
        (digits, 8)
    } else if let Some(digits) = blockszs.strip_prefix("0b") {
        (digits, 2)
    } else {
        (blockszs.as_str(), 10)
    };
    let blocksz_: BlockSz = match BlockSz::from_str_radix(digits, radix) {
        Ok(val) => val,
        Err(err) => return Err(format!("{} {}", errs, err)),
    };
    if !(BLOCKSZ_MIN <= blocksz_ && blocksz_ <= BLOCKSZ_MAX) {
        return Err(format!("--blocksz must be {} ≤ BLOCKSZ ≤ {}, it was {:?}", BLOCKSZ_MIN, BLOCKSZ_MAX, blockszs));
    }

    Ok(blocksz_)
}

/// `clap` argument validator for `--blocksz`.
fn cli_parse_blocksz(blockszs: &str) -> std::result::Result<String, String> {
    match cli_process_blocksz(&String::from(blockszs)) {
        Ok(val) => Ok(val.to_string()),
        Err(err) => Err(err),
    }
}

/// Everything the scan needs from the command-line.
struct CLI_Processed {
    root: FPath,
    window: ScanWindow,
    config: ScanConfig,
    color_choice: ColorChoice,
    summary: bool,
}

/// Process user-passed command-line arguments.
fn cli_process_args(args: CLI_Args) -> anyhow::Result<CLI_Processed> {
    defn!("{:?}", args);
    let window = ScanWindow::new(
        args.after.unwrap_or(EpochMillis::MIN),
        args.before.unwrap_or(EpochMillis::MAX),
    );
    if window.is_inverted() {
        e_wrn!(
            "--after {} is later than --before {}; nothing will be found",
            millis_to_rfc3339(window.start_epoch),
            millis_to_rfc3339(window.end_epoch)
        );
    }
    // `num_args = 2` guarantees pairs
    let rules: TimestampRules = args
        .rules
        .chunks_exact(2)
        .map(|pair| TimestampRule::new(pair[0].as_str(), pair[1].as_str()))
        .collect();
    let levels = LevelFilter::from_names(&args.levels)
        .map_err(|err| anyhow!(err))
        .context("--level")?;
    let blocksz: BlockSz = cli_process_blocksz(&args.blocksz).map_err(|err| anyhow!(err))?;
    let color_choice: ColorChoice = match args.color_choice {
        CLI_Color_Choice::always => ColorChoice::Always,
        CLI_Color_Choice::auto => ColorChoice::Auto,
        CLI_Color_Choice::never => ColorChoice::Never,
    };
    let config = ScanConfig {
        rules,
        levels,
        include: args.include,
        exclude: args.exclude,
        timestamp_fields: args.json_fields,
        keywords: args.keywords,
        workers: args.workers,
        blocksz,
        parallel_walk: args.parallel_walk,
    };
    defx!("window {}, config {:?}", window, config);

    Ok(CLI_Processed {
        root: args.root,
        window,
        config,
        color_choice,
        summary: args.summary,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// signals
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Set a process signal handler that cancels `cancel`, and a thread that
/// tells the user once cancellation begins.
fn set_signal_handler(cancel: &CancelToken) -> anyhow::Result<()> {
    defn!();
    let cancel_handler: CancelToken = cancel.clone();
    ctrlc::set_handler(move || {
        defñ!("ctrlc handler");
        cancel_handler.cancel();
    })?;
    let recv_cancel = cancel.subscribe();
    // detached; exits with the process
    thread::Builder::new()
        .name(String::from("lws-cancel-notice"))
        .spawn(move || {
            if recv_cancel.recv().is_ok() {
                e_wrn!("cancelled; printing entries found so far");
            }
        })?;
    defx!();

    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// main
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Diagnostics go to stderr, and are also counted for `--summary`.
struct DiagnosticsMain {
    stderr: DiagnosticsStderr,
    collect: Option<DiagnosticsCollect>,
}

impl DiagnosticSink for DiagnosticsMain {
    fn diagnostic(
        &self,
        diagnostic: Diagnostic,
    ) {
        if let Some(collect) = self.collect.as_ref() {
            collect.diagnostic(diagnostic.clone());
        }
        self.stderr.diagnostic(diagnostic);
    }
}

fn run(processed: CLI_Processed) -> anyhow::Result<ScanOutput> {
    let cancel = CancelToken::new();
    if let Err(err) = set_signal_handler(&cancel) {
        // the scan can still run, it just cannot be interrupted gracefully
        e_wrn!("failed to set a Ctrl+C handler: {}", err);
    }
    let diagnostics = DiagnosticsMain {
        stderr: DiagnosticsStderr,
        collect: processed.summary.then(DiagnosticsCollect::new),
    };
    let output: ScanOutput = scan_with_summary(
        &processed.root,
        &processed.window,
        &processed.config,
        &cancel,
        &diagnostics,
        &ProgressNull,
    )
    .with_context(|| format!("scan of {:?} failed", processed.root))?;

    let stdout = termcolor::StandardStream::stdout(processed.color_choice);
    let mut printer = PrinterGroup::new(stdout.lock(), &processed.config.keywords);
    if let Err(err) = printer.print_groups(&output.groups) {
        // a closed pipe is not worth reporting
        if err.kind() != std::io::ErrorKind::BrokenPipe {
            return Err(anyhow!(err).context("printing failed"));
        }
    }
    if processed.summary {
        let count: usize = diagnostics
            .collect
            .as_ref()
            .map(|collect| collect.len())
            .unwrap_or(0);
        print_summaries(&output, count);
    }

    Ok(output)
}

pub fn main() -> ExitCode {
    let start_time = Instant::now();
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    defn!();

    let args = CLI_Args::parse();
    let color_choice_err: Option<ColorChoice> = match args.color_choice {
        CLI_Color_Choice::never => Some(ColorChoice::Never),
        _ => None,
    };
    let exitcode: ExitCode = match cli_process_args(args).and_then(run) {
        Ok(output) => {
            defo!(
                "{} groups from {} files in {:?}",
                output.groups.len(),
                output.files_total,
                start_time.elapsed()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let message: String = format!("ERROR: {:#}\n", err);
            if print_colored_stderr(COLOR_ERROR, color_choice_err, message.as_bytes()).is_err() {
                e_err!("{:#}", err);
            }
            ExitCode::FAILURE
        }
    };
    defx!("exitcode {:?}", exitcode);

    exitcode
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
