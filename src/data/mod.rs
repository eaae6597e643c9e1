// src/data/mod.rs

//! The `data` module is specialized data containers and the pure
//! functions over them.
//!
//! ## Definitions of data
//!
//! ### Timestamp rule
//!
//! A "timestamp rule" is a regular expression paired with a timestamp
//! format. Rules are compiled once per scan into read-only matchers.
//! See [`TimestampRule`] and [`CompiledMatcher`].
//!
//! ### Log entry
//!
//! A "log entry" is either:
//!
//! * a single line with a timestamp found by a matcher ("plain"), or
//! * a JSON object, beginning on a line starting with `{` and possibly
//!   spanning many lines, with a timestamp in a top-level field ("json").
//!
//! A log entry is represented by a [`LogEntry`].
//!
//! ### Group
//!
//! A "group" is a maximal contiguous run of sorted log entries from one
//! file whose timestamps do not decrease. See [`Group`].
//!
//! [`TimestampRule`]: crate::data::timestamprule::TimestampRule
//! [`CompiledMatcher`]: crate::data::timestamprule::CompiledMatcher
//! [`LogEntry`]: crate::data::logentry::LogEntry
//! [`Group`]: crate::data::group::Group

pub mod datetime;
pub mod diagnostic;
pub mod group;
pub mod logentry;
pub mod timestamprule;
