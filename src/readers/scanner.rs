// src/readers/scanner.rs

//! Implements [`scan`], the coordinator of one scan of a directory tree.
//!
//! 1. enumerate candidate files under the root ([`enumerate_files`])
//! 2. compile the timestamp rules ([`compile_rules`])
//! 3. process files on a fixed-size pool of worker threads; each worker
//!    parses one file at a time and filters its candidates
//! 4. merge the per-file results in discovery order, stable sort by
//!    timestamp, and partition into [`Group`]s
//!
//! Cancellation is checked by each worker before taking a file and, within a
//! file, before each line. Entries gathered before cancellation are kept.
//!
//! [`enumerate_files`]: crate::readers::filepreprocessor::enumerate_files
//! [`compile_rules`]: crate::data::timestamprule::compile_rules
//! [`Group`]: crate::data::group::Group

use crate::common::{debug_panic, Count, FPath, FPaths};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::data::datetime::ScanWindow;
use crate::data::diagnostic::DiagnosticSink;
use crate::data::group::{group_entries, Groups};
use crate::data::logentry::{LogEntries, LogEntry};
use crate::data::timestamprule::{compile_rules, CompiledMatcher, TimestampRules};
use crate::readers::cancel::CancelToken;
use crate::readers::entryfilter::{EntryFilter, LevelFilter};
use crate::readers::entryparser::{parse_file, ParseResult};
use crate::readers::filepreprocessor::{enumerate_files, GLOB_INCLUDE_DEFAULT};
use crate::readers::linereader::{BlockSz, BLOCKSZ_DEF};
use crate::readers::summary::{FileProcessingResult, Summaries, Summary};

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use ::crossbeam_channel::{unbounded, Receiver};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ScanConfig
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default count of file processing threads.
pub const WORKERS_DEF: usize = 4;

/// Default JSON field names searched for a timestamp, in order.
pub const TIMESTAMP_FIELDS_DEF: [&str; 6] = ["timestamp", "@timestamp", "time", "ts", "datetime", "date"];

/// Unique index of a file in discovery order.
pub type PathId = usize;

/// Settings for one scan. Not changed once a scan begins.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanConfig {
    /// timestamp rules in priority order
    pub rules: TimestampRules,
    pub levels: LevelFilter,
    /// globs matched against root-relative paths
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// JSON top-level field names searched for a timestamp, in order
    pub timestamp_fields: Vec<String>,
    /// for highlighting by printers; not used by the scan
    pub keywords: Vec<String>,
    /// count of file processing threads
    pub workers: usize,
    /// read block size
    pub blocksz: BlockSz,
    /// read directories in parallel
    pub parallel_walk: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            rules: TimestampRules::new(),
            levels: LevelFilter::All,
            include: vec![GLOB_INCLUDE_DEFAULT.to_string()],
            exclude: Vec::new(),
            timestamp_fields: TIMESTAMP_FIELDS_DEF
                .iter()
                .map(|s| s.to_string())
                .collect(),
            keywords: Vec::new(),
            workers: WORKERS_DEF,
            blocksz: BLOCKSZ_DEF,
            parallel_walk: false,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ScanError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A failure of the whole scan.
///
/// Failures of single files, lines, or rules are not `ScanError`s; they are
/// passed to the [`DiagnosticSink`].
#[derive(Debug)]
pub enum ScanError {
    RootNotExist(FPath),
    RootNotADirectory(FPath),
    RootUnreadable(FPath, io::Error),
    /// not one file processing thread could be created
    WorkerSpawn(io::Error),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::RootNotExist(path) => write!(f, "path does not exist {:?}", path),
            ScanError::RootNotADirectory(path) => write!(f, "path is not a directory {:?}", path),
            ScanError::RootUnreadable(path, err) => write!(f, "cannot read directory {:?}: {}", path, err),
            ScanError::WorkerSpawn(err) => write!(f, "failed to create a file processing thread: {}", err),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::RootUnreadable(_, err) => Some(err),
            ScanError::WorkerSpawn(err) => Some(err),
            _ => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ProgressSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Receiver of per-file progress.
pub trait ProgressSink: Send + Sync {
    /// Called once after each processed file, on the thread that processed
    /// it, before that thread takes another file.
    fn file_done(
        &self,
        path: &FPath,
        accepted: Count,
        files_done: usize,
        files_total: usize,
    );
}

/// Ignores progress.
#[derive(Debug, Default)]
pub struct ProgressNull;

impl ProgressSink for ProgressNull {
    fn file_done(
        &self,
        _path: &FPath,
        _accepted: Count,
        _files_done: usize,
        _files_total: usize,
    ) {
    }
}

/// Forwards progress to a closure.
pub struct ProgressFn<F>(pub F)
where
    F: Fn(&FPath, Count, usize, usize) + Send + Sync;

impl<F> ProgressSink for ProgressFn<F>
where
    F: Fn(&FPath, Count, usize, usize) + Send + Sync,
{
    fn file_done(
        &self,
        path: &FPath,
        accepted: Count,
        files_done: usize,
        files_total: usize,
    ) {
        (self.0)(path, accepted, files_done, files_total)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// scan
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything gathered by [`scan_with_summary`].
#[derive(Clone, Debug, Default)]
pub struct ScanOutput {
    pub groups: Groups,
    /// one per enumerated file, in discovery order
    pub summaries: Summaries,
    pub files_total: usize,
    /// cancellation was requested before the scan finished
    pub cancelled: bool,
}

impl ScanOutput {
    /// Count of entries in all groups.
    pub fn entries_count(&self) -> usize {
        self.groups
            .iter()
            .map(|group| group.len())
            .sum()
    }
}

/// Read-only data shared by all workers.
struct WorkerContext<'a> {
    matchers: &'a [CompiledMatcher],
    filter: &'a EntryFilter,
    config: &'a ScanConfig,
    cancel: &'a CancelToken,
    diagnostics: &'a dyn DiagnosticSink,
    progress: &'a dyn ProgressSink,
    files_done: AtomicUsize,
    files_total: usize,
}

/// Result of one file.
type FileResult = (PathId, LogEntries, Summary);

/// Parse and filter one file.
fn process_file(
    path: &FPath,
    ctx: &WorkerContext,
) -> (LogEntries, Summary) {
    defn!("({:?})", path);
    let mut summary = Summary::new(path.clone());
    let mut entries = LogEntries::new();
    let (result, summary_parser) = parse_file(
        path,
        ctx.config.blocksz,
        ctx.matchers,
        &ctx.config.timestamp_fields,
        ctx.cancel,
        ctx.diagnostics,
        |entry: LogEntry| {
            let result = ctx.filter.check(&entry);
            summary.update_filter(result, entry.timestamp_millis);
            if result.is_pass() {
                entries.push(entry);
            }
        },
    );
    summary.parser = summary_parser;
    summary.result = match result {
        ParseResult::Done => FileProcessingResult::FileOk,
        ParseResult::Cancelled => FileProcessingResult::FileCancelled,
        ParseResult::ErrOpen(err) => FileProcessingResult::FileErrOpen(err),
        ParseResult::ErrRead(err) => FileProcessingResult::FileErrRead(err),
    };
    defx!("({:?}) {} accepted, {:?}", path, entries.len(), summary.result);

    (entries, summary)
}

/// A worker thread. Takes files from `recv_job` until the channel is empty
/// or cancellation is requested.
fn exec_worker(
    recv_job: Receiver<(PathId, FPath)>,
    ctx: &WorkerContext,
) -> Vec<FileResult> {
    defn!();
    let mut results = Vec::<FileResult>::new();
    loop {
        if ctx.cancel.is_cancelled() {
            defo!("cancelled");
            break;
        }
        let (pathid, path) = match recv_job.recv() {
            Ok(job) => job,
            Err(_) => break,
        };
        let (entries, summary) = process_file(&path, ctx);
        let files_done = ctx.files_done.fetch_add(1, Ordering::SeqCst) + 1;
        ctx.progress
            .file_done(&path, summary.accepted, files_done, ctx.files_total);
        results.push((pathid, entries, summary));
    }
    defx!("{} files", results.len());

    results
}

/// Run `workers` worker threads over `paths`. Returns results of all files
/// that were processed, in no particular order.
fn run_workers(
    paths: &FPaths,
    workers: usize,
    ctx: &WorkerContext,
) -> Result<Vec<FileResult>, ScanError> {
    let (send_job, recv_job) = unbounded::<(PathId, FPath)>();
    for (pathid, path) in paths.iter().enumerate() {
        // the receiver is held here so the send cannot fail
        if send_job.send((pathid, path.clone())).is_err() {
            debug_panic!("job channel disconnected");
        }
    }
    drop(send_job);

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        let mut spawn_err: Option<io::Error> = None;
        for n in 0..workers {
            let recv_job_ = recv_job.clone();
            match thread::Builder::new()
                .name(format!("lws-worker-{}", n))
                .spawn_scoped(scope, move || exec_worker(recv_job_, ctx))
            {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    e_err!("thread.name(\"lws-worker-{}\").spawn() failed {:?}", n, err);
                    spawn_err = Some(err);
                }
            }
        }
        drop(recv_job);
        if handles.is_empty() {
            if let Some(err) = spawn_err {
                return Err(ScanError::WorkerSpawn(err));
            }
        }
        let mut results = Vec::<FileResult>::with_capacity(paths.len());
        for handle in handles.into_iter() {
            match handle.join() {
                Ok(results_) => results.extend(results_),
                Err(_) => e_err!("a file processing thread panicked"),
            }
        }

        Ok(results)
    })
}

/// Scan `root` returning the groups of entries within `window` passing
/// `config`, with per-file summaries.
///
/// Fails only if `root` is not a readable directory or no worker thread
/// could be created. Everything else skipped is passed to `diagnostics`.
pub fn scan_with_summary(
    root: &FPath,
    window: &ScanWindow,
    config: &ScanConfig,
    cancel: &CancelToken,
    diagnostics: &dyn DiagnosticSink,
    progress: &dyn ProgressSink,
) -> Result<ScanOutput, ScanError> {
    defn!("({:?}, {}, workers {})", root, window, config.workers);
    let workers: usize = config.workers.max(1);
    let paths: FPaths = enumerate_files(
        root,
        &config.include,
        &config.exclude,
        config.parallel_walk,
        workers,
        diagnostics,
    )?;
    let matchers = compile_rules(&config.rules, diagnostics);
    let filter = EntryFilter::new(*window, config.levels.clone());
    let files_total: usize = paths.len();
    defo!("{} files, {} matchers", files_total, matchers.len());

    let ctx = WorkerContext {
        matchers: &matchers,
        filter: &filter,
        config,
        cancel,
        diagnostics,
        progress,
        files_done: AtomicUsize::new(0),
        files_total,
    };
    let results: Vec<FileResult> = match files_total {
        0 => Vec::new(),
        _ => run_workers(&paths, workers.min(files_total), &ctx)?,
    };

    // merge in discovery order
    let mut map_pathid_result: BTreeMap<PathId, (LogEntries, Summary)> = results
        .into_iter()
        .map(|(pathid, entries, summary)| (pathid, (entries, summary)))
        .collect();
    let mut entries = LogEntries::new();
    let mut summaries = Summaries::with_capacity(files_total);
    for (pathid, path) in paths.iter().enumerate() {
        match map_pathid_result.remove(&pathid) {
            Some((entries_, summary)) => {
                entries.extend(entries_);
                summaries.push(summary);
            }
            None => summaries.push(Summary::new(path.clone())),
        }
    }
    // stable; ties keep discovery order
    entries.sort_by_key(|entry| entry.timestamp_millis);
    let groups = group_entries(entries);
    let output = ScanOutput {
        groups,
        summaries,
        files_total,
        cancelled: cancel.is_cancelled(),
    };
    defx!("{} groups, {} entries, cancelled {}", output.groups.len(), output.entries_count(), output.cancelled);

    Ok(output)
}

/// Scan `root` returning the groups of entries within `window` passing
/// `config`.
///
/// See [`scan_with_summary`].
pub fn scan(
    root: &FPath,
    window: &ScanWindow,
    config: &ScanConfig,
    cancel: &CancelToken,
    diagnostics: &dyn DiagnosticSink,
) -> Result<Groups, ScanError> {
    let output = scan_with_summary(root, window, config, cancel, diagnostics, &ProgressNull)?;

    Ok(output.groups)
}
