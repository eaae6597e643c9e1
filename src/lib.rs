// src/lib.rs

//! _lwslib_ scans a directory tree of log files for entries within a window
//! of time.
//!
//! See [`scan`].
//!
//! [`scan`]: crate::readers::scanner::scan

#![allow(non_snake_case)]

pub mod common;
pub mod data;
pub mod debug;
pub mod printer;
pub mod readers;
#[cfg(test)]
pub mod tests;
