// src/common.rs

//! Common imports, type aliases, and other globals for _lwslib_
//! (avoids circular imports).

use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[doc(hidden)]
pub use std::fs::File;
#[doc(hidden)]
pub use std::path::Path;

// TODO: use `std::path::PathBuf` for `FPath`; every `LogEntry` would then
//       carry a `PathBuf` which complicates the printers
/// `F`ile `Path` as a `String`.
pub type FPath = String;
pub type FPaths = Vec<FPath>;
pub type FileOpenOptions = std::fs::OpenOptions;

/// A general-purpose counting type.
pub type Count = u64;

/// Offset into a file in bytes.
pub type FileOffset = u64;

/// A line number within a file, one-based.
pub type LineNumber = u64;

/// Milliseconds since the Unix epoch, UTC.
pub type EpochMillis = i64;

/// Newline as `u8`.
#[allow(non_upper_case_globals)]
pub const NLu8: u8 = b'\n';

/// Carriage return as `u8`.
#[allow(non_upper_case_globals)]
pub const CRu8: u8 = b'\r';

/// Convert a [`Path`] to a [`FPath`].
pub fn path_to_fpath(path: &Path) -> FPath {
    path.to_string_lossy().to_string()
}

/// Convert a [`FPath`] to a [`Path`].
pub fn fpath_to_path(path: &FPath) -> &Path {
    Path::new(path.as_str())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// custom Results enums for various *Reader functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `Result` Extended
/// for reading functions that may find nothing more to read.
#[derive(Debug, PartialEq)]
pub enum ResultS3<T, E> {
    /// Contains the success data
    Found(T),
    /// File is empty, or other condition that means "Done", nothing to
    /// return, but no bad errors happened
    Done,
    /// Contains the error value, something bad happened
    Err(E),
}

impl<T, E> ResultS3<T, E> {
    /// Returns `true` if the result is [`Found`] or [`Done`].
    ///
    /// [`Found`]: ResultS3::Found
    /// [`Done`]: ResultS3::Done
    #[inline(always)]
    pub const fn is_ok(&self) -> bool {
        matches!(*self, ResultS3::Found(_) | ResultS3::Done)
    }

    /// Returns `true` if the result is [`Err`].
    ///
    /// [`Err`]: ResultS3::Err
    #[inline(always)]
    pub const fn is_err(&self) -> bool {
        !self.is_ok()
    }

    /// Returns `true` if the result is [`Done`].
    ///
    /// [`Done`]: ResultS3::Done
    #[inline(always)]
    pub const fn is_done(&self) -> bool {
        matches!(*self, ResultS3::Done)
    }

    /// Converts from `ResultS3<T, E>` to [`Option<T>`],
    /// discarding the error, if any.
    #[inline(always)]
    pub fn ok(self) -> Option<T> {
        match self {
            ResultS3::Found(x) => Some(x),
            ResultS3::Done => None,
            ResultS3::Err(_) => None,
        }
    }
}

impl<T, E> fmt::Display for ResultS3<T, E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultS3::Found(_) => write!(f, "ResultS3::Found"),
            ResultS3::Done => write!(f, "ResultS3::Done"),
            ResultS3::Err(err) => write!(f, "ResultS3::Err({})", err),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// misc.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `panic!` in debug builds, print an error in release builds.
///
/// For conditions that "should never happen" but are not worth crashing
/// a user's release build over.
#[macro_export]
macro_rules! debug_panic {
    (
        $($args:tt)*
    ) => {
        {
            #[cfg(any(debug_assertions, test))]
            panic!($($args)*);
            #[cfg(not(any(debug_assertions, test)))]
            $crate::e_err!($($args)*);
        }
    }
}
pub use debug_panic;
