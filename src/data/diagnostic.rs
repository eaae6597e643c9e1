// src/data/diagnostic.rs

//! Implements [`Diagnostic`], notices about anything skipped during a scan,
//! and the [`DiagnosticSink`]s that receive them.
//!
//! Diagnostics never affect a scan's result, only observability.

use crate::common::{FPath, LineNumber};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};

use std::fmt;
use std::sync::Mutex;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Diagnostic
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A skip or parse-failure notice.
///
/// `String` error descriptions are stored, not `std::io::Error`, so that a
/// `Diagnostic` is `Clone` and may be collected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Diagnostic {
    /// A timestamp rule regular expression failed to compile.
    /// `(rule index, expression, error)`
    RuleInvalid(usize, String, String),
    /// A timestamp rule format specifier could not be translated.
    /// `(rule index, format, error)`
    FormatInvalid(usize, String, String),
    /// An include or exclude glob pattern is invalid.
    /// `(pattern, error)`
    GlobInvalid(String, String),
    /// A directory or directory entry could not be read during traversal.
    /// `(path if known, error)`
    TraversalSkipped(Option<FPath>, String),
    /// A file could not be opened.
    FileOpenFailed(FPath, String),
    /// A read error occurred partway through a file.
    FileReadFailed(FPath, String),
    /// An accumulated JSON block did not parse.
    /// `(path, first line number, error)`
    JsonParseFailed(FPath, LineNumber, String),
    /// An accumulated JSON block had no valid timestamp field.
    JsonNoTimestamp(FPath, LineNumber),
    /// A JSON block was still open at end of file and was discarded.
    JsonUnterminated(FPath, LineNumber),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RuleInvalid(index, expr, err) => {
                write!(f, "timestamp rule {} expression {:?} skipped: {}", index, expr, err)
            }
            Diagnostic::FormatInvalid(index, format, err) => {
                write!(f, "timestamp rule {} format {:?} skipped: {}", index, format, err)
            }
            Diagnostic::GlobInvalid(pattern, err) => {
                write!(f, "glob pattern {:?} skipped: {}", pattern, err)
            }
            Diagnostic::TraversalSkipped(Some(path), err) => {
                write!(f, "skipped {:?}: {}", path, err)
            }
            Diagnostic::TraversalSkipped(None, err) => write!(f, "skipped: {}", err),
            Diagnostic::FileOpenFailed(path, err) => {
                write!(f, "failed to open {:?}: {}", path, err)
            }
            Diagnostic::FileReadFailed(path, err) => {
                write!(f, "failed to read {:?}: {}", path, err)
            }
            Diagnostic::JsonParseFailed(path, line, err) => {
                write!(f, "{}:{} JSON block skipped: {}", path, line, err)
            }
            Diagnostic::JsonNoTimestamp(path, line) => {
                write!(f, "{}:{} JSON block skipped: no timestamp field", path, line)
            }
            Diagnostic::JsonUnterminated(path, line) => {
                write!(f, "{}:{} JSON block skipped: not closed before end of file", path, line)
            }
        }
    }
}

pub type Diagnostics = Vec<Diagnostic>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DiagnosticSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Receiver of [`Diagnostic`]s.
///
/// Called from file processing threads, so must be `Sync`.
pub trait DiagnosticSink: Send + Sync {
    fn diagnostic(
        &self,
        diagnostic: Diagnostic,
    );
}

/// Discards all diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticsNull;

impl DiagnosticSink for DiagnosticsNull {
    fn diagnostic(
        &self,
        _diagnostic: Diagnostic,
    ) {
        defñ!("{}", _diagnostic);
    }
}

/// Prints each diagnostic to stderr as a warning.
#[derive(Debug, Default)]
pub struct DiagnosticsStderr;

impl DiagnosticSink for DiagnosticsStderr {
    fn diagnostic(
        &self,
        diagnostic: Diagnostic,
    ) {
        e_wrn!("{}", diagnostic);
    }
}

/// Stores each diagnostic, in order received.
#[derive(Debug, Default)]
pub struct DiagnosticsCollect {
    diagnostics: Mutex<Diagnostics>,
}

impl DiagnosticsCollect {
    pub fn new() -> DiagnosticsCollect {
        DiagnosticsCollect::default()
    }

    /// Copy of all diagnostics received so far.
    pub fn diagnostics(&self) -> Diagnostics {
        match self.diagnostics.lock() {
            Ok(diagnostics) => diagnostics.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.diagnostics.lock() {
            Ok(diagnostics) => diagnostics.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for DiagnosticsCollect {
    fn diagnostic(
        &self,
        diagnostic: Diagnostic,
    ) {
        defñ!("{}", diagnostic);
        match self.diagnostics.lock() {
            Ok(mut diagnostics) => diagnostics.push(diagnostic),
            Err(poisoned) => {
                de_err!("DiagnosticsCollect mutex poisoned");
                poisoned.into_inner().push(diagnostic);
            }
        }
    }
}

/// Forwards each diagnostic to a closure.
pub struct DiagnosticsFn<F>(pub F)
where
    F: Fn(Diagnostic) + Send + Sync;

impl<F> DiagnosticSink for DiagnosticsFn<F>
where
    F: Fn(Diagnostic) + Send + Sync,
{
    fn diagnostic(
        &self,
        diagnostic: Diagnostic,
    ) {
        (self.0)(diagnostic)
    }
}
