// src/printer/mod.rs

//! The `printer` module is for printing user-facing output, [`Group`s] of
//! [`LogEntry`s] with various text effects (color, keyword highlighting),
//! and the `--summary` statistics.
//!
//! [`Group`s]: crate::data::group::Group
//! [`LogEntry`s]: crate::data::logentry::LogEntry

pub mod printers;
pub mod summary;
