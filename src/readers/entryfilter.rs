// src/readers/entryfilter.rs

//! Implements the range and level filter applied to each candidate
//! [`LogEntry`].
//!
//! [`LogEntry`]: crate::data::logentry::LogEntry

#![allow(non_camel_case_types)]

use crate::data::datetime::{Result_Filter_Window, ScanWindow};
use crate::data::logentry::{Level, LogEntry, LEVEL_ALL_SENTINEL};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LevelFilter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which severities of plain entries are accepted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum LevelFilter {
    /// every plain entry, including those without a detected severity
    #[default]
    All,
    /// only plain entries with a detected severity in the set
    Levels(BTreeSet<Level>),
}

impl LevelFilter {
    /// Create from level names. Any name equal to `"ALL"`
    /// (case-insensitive) means [`LevelFilter::All`].
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<LevelFilter, String> {
        let mut levels = BTreeSet::<Level>::new();
        for name in names.iter() {
            let name = name.as_ref().trim();
            if name.eq_ignore_ascii_case(LEVEL_ALL_SENTINEL) {
                return Ok(LevelFilter::All);
            }
            levels.insert(Level::from_str(name)?);
        }

        Ok(LevelFilter::Levels(levels))
    }

    pub const fn is_all(&self) -> bool {
        matches!(self, LevelFilter::All)
    }

    /// Is a plain entry with `severity` accepted?
    pub fn accepts(
        &self,
        severity: Option<Level>,
    ) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Levels(levels) => match severity {
                Some(level) => levels.contains(&level),
                None => false,
            },
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelFilter::All => f.write_str(LEVEL_ALL_SENTINEL),
            LevelFilter::Levels(levels) => {
                let names: Vec<&str> = levels.iter().map(|l| l.as_str()).collect();
                write!(f, "{}", names.join(","))
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EntryFilter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of [`EntryFilter::check`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Result_Filter_Entry {
    Pass,
    /// timestamp before the window start
    FailBefore,
    /// timestamp after the window end
    FailAfter,
    /// plain entry severity not accepted
    FailLevel,
}

impl Result_Filter_Entry {
    #[inline(always)]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Result_Filter_Entry::Pass)
    }
}

/// Accepts a candidate [`LogEntry`] if its timestamp is within the window
/// and, for plain entries, its severity passes the [`LevelFilter`].
///
/// JSON entries have no severity and are accepted on the window alone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryFilter {
    window: ScanWindow,
    levels: LevelFilter,
}

impl EntryFilter {
    pub fn new(
        window: ScanWindow,
        levels: LevelFilter,
    ) -> EntryFilter {
        EntryFilter { window, levels }
    }

    pub fn window(&self) -> &ScanWindow {
        &self.window
    }

    pub fn levels(&self) -> &LevelFilter {
        &self.levels
    }

    pub fn check(
        &self,
        entry: &LogEntry,
    ) -> Result_Filter_Entry {
        match self.window.position(entry.timestamp_millis) {
            Result_Filter_Window::BeforeRange => return Result_Filter_Entry::FailBefore,
            Result_Filter_Window::AfterRange => return Result_Filter_Entry::FailAfter,
            Result_Filter_Window::InRange => {}
        }
        if entry.is_json() || self.levels.accepts(entry.severity) {
            return Result_Filter_Entry::Pass;
        }

        Result_Filter_Entry::FailLevel
    }

    #[inline(always)]
    pub fn accept(
        &self,
        entry: &LogEntry,
    ) -> bool {
        self.check(entry).is_pass()
    }
}
