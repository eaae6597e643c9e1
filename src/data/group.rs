// src/data/group.rs

//! Implements [`Group`], a contiguous run of [`LogEntry`]s from one file,
//! and [`group_entries`], the partitioning of a sorted entry sequence into
//! `Group`s.

use crate::common::{EpochMillis, FPath};
use crate::data::logentry::{LogEntries, LogEntry};

use ::more_asserts::debug_assert_ge;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// A maximal run of entries sharing a file with non-decreasing timestamps.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Group {
    pub file_path: FPath,
    /// timestamp of the first entry
    pub start_timestamp: EpochMillis,
    /// timestamp of the last entry
    pub end_timestamp: EpochMillis,
    pub entries: LogEntries,
}

impl Group {
    /// A new `Group` seeded by `entry`.
    pub fn new(entry: LogEntry) -> Group {
        Group {
            file_path: entry.file_path.clone(),
            start_timestamp: entry.timestamp_millis,
            end_timestamp: entry.timestamp_millis,
            entries: vec![entry],
        }
    }

    /// Can `entry` extend this group?
    pub fn accepts(
        &self,
        entry: &LogEntry,
    ) -> bool {
        self.file_path == entry.file_path && entry.timestamp_millis >= self.end_timestamp
    }

    fn push(
        &mut self,
        entry: LogEntry,
    ) {
        debug_assert_ge!(entry.timestamp_millis, self.end_timestamp);
        self.end_timestamp = entry.timestamp_millis;
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type Groups = Vec<Group>;

/// Partition `entries`, already sorted by timestamp, into [`Group`]s.
///
/// A new group starts whenever the file changes or the timestamp decreases
/// relative to the current group's last entry.
pub fn group_entries(entries: LogEntries) -> Groups {
    defn!("({} entries)", entries.len());
    let mut groups = Groups::new();
    let mut current: Option<Group> = None;
    for entry in entries.into_iter() {
        match current.as_mut() {
            Some(group) if group.accepts(&entry) => group.push(entry),
            _ => {
                if let Some(group) = current.take() {
                    groups.push(group);
                }
                current = Some(Group::new(entry));
            }
        }
    }
    if let Some(group) = current {
        groups.push(group);
    }
    defx!("{} groups", groups.len());

    groups
}
