// src/readers/mod.rs

//! "Readers" for _lwslib_.
//!
//! ## Overview of readers
//!
//! * [`scan`] enumerates files with [`enumerate_files`] then runs a pool of
//!   worker threads.
//! * Each worker drives an [`EntryParser`] over one file at a time, and checks
//!   each candidate with an [`EntryFilter`].
//! * An `EntryParser` drives a [`LineReader`] to derive lines.
//! * A `LineReader` reads fixed-size blocks of bytes.
//!
//! A [`CancelToken`] stops all of the above at the next line.
//!
//! Also see [_Definitions of data_].
//!
//! <br/>
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [_Definitions of data_]: crate::data
//! [`Read`]: std::io::Read
//! [`scan`]: crate::readers::scanner::scan
//! [`enumerate_files`]: crate::readers::filepreprocessor::enumerate_files
//! [`EntryParser`]: crate::readers::entryparser::EntryParser
//! [`EntryFilter`]: crate::readers::entryfilter::EntryFilter
//! [`LineReader`]: crate::readers::linereader::LineReader
//! [`CancelToken`]: crate::readers::cancel::CancelToken

pub mod cancel;
pub mod entryfilter;
pub mod entryparser;
pub mod filepreprocessor;
pub mod linereader;
pub mod scanner;
pub mod summary;
