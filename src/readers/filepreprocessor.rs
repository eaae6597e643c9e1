// src/readers/filepreprocessor.rs

//! A collection of functions to search a directory tree for files to scan.
//!
//! A file is a candidate if it is a regular file and its path, relative to
//! the root, matches any include glob and no exclude glob.

use crate::common::{fpath_to_path, path_to_fpath, FPath, FPaths, Path};
use crate::data::diagnostic::{Diagnostic, DiagnosticSink};
use crate::readers::scanner::ScanError;

use std::fs::FileType;
use std::path::PathBuf;

use ::globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GlobFilter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default include glob, every file.
pub const GLOB_INCLUDE_DEFAULT: &str = "**/*";

/// Compile one glob. `*` does not cross a `/`; `**` does.
fn compile_glob(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
}

/// Compile `patterns` into one `GlobSet`, skipping invalid patterns with a
/// [`Diagnostic`].
fn compile_globset(
    patterns: &[String],
    diagnostics: &dyn DiagnosticSink,
) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns.iter() {
        match compile_glob(pattern.as_str()) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => {
                defo!("bad glob {:?} {}", pattern, err);
                diagnostics.diagnostic(Diagnostic::GlobInvalid(pattern.clone(), err.kind().to_string()));
            }
        }
    }
    // a set of already-valid globs only fails on regex size limits
    match builder.build() {
        Ok(set) => set,
        Err(err) => {
            diagnostics.diagnostic(Diagnostic::GlobInvalid(patterns.join(" "), err.to_string()));
            GlobSet::empty()
        }
    }
}

/// Include and exclude glob sets matched against root-relative paths.
#[derive(Clone, Debug)]
pub struct GlobFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl GlobFilter {
    /// Invalid patterns are skipped with a diagnostic. If no include pattern
    /// is valid then no path matches.
    pub fn new(
        include: &[String],
        exclude: &[String],
        diagnostics: &dyn DiagnosticSink,
    ) -> GlobFilter {
        let include = compile_globset(include, diagnostics);
        let exclude = compile_globset(exclude, diagnostics);
        defñ!("include {} exclude {}", include.len(), exclude.len());

        GlobFilter { include, exclude }
    }

    /// `relative` uses `/` separators.
    pub fn is_match(
        &self,
        relative: &str,
    ) -> bool {
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }
}

/// `path` relative to `root`, with `/` separators.
///
/// `None` if `path` is not under `root`, or is `root`.
pub fn relative_path(
    root: &Path,
    path: &Path,
) -> Option<String> {
    let relative: &Path = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }

    Some(parts.join("/"))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// enumerate
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Check the scan root is an existing readable directory.
pub fn check_root(root: &FPath) -> Result<(), ScanError> {
    let path: &Path = fpath_to_path(root);
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::RootNotExist(root.clone()));
        }
        Err(err) => return Err(ScanError::RootUnreadable(root.clone(), err)),
    };
    if !metadata.is_dir() {
        return Err(ScanError::RootNotADirectory(root.clone()));
    }
    if let Err(err) = std::fs::read_dir(path) {
        return Err(ScanError::RootUnreadable(root.clone(), err));
    }

    Ok(())
}

/// Keep `path` if it is a regular file passing `filter`.
fn filter_entry(
    root: &Path,
    path: PathBuf,
    file_type: FileType,
    filter: &GlobFilter,
    paths: &mut FPaths,
) {
    if !file_type.is_file() {
        return;
    }
    let relative: String = match relative_path(root, &path) {
        Some(relative) => relative,
        None => return,
    };
    if filter.is_match(relative.as_str()) {
        defo!("match {:?}", relative);
        paths.push(path_to_fpath(&path));
    } else {
        defo!("no match {:?}", relative);
    }
}

/// Walk `root` on this thread.
fn walk_sequential(
    root: &Path,
    filter: &GlobFilter,
    diagnostics: &dyn DiagnosticSink,
) -> FPaths {
    let mut paths = FPaths::new();
    for entry in walkdir::WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                defo!("Err({:?})", err);
                let path: Option<FPath> = err.path().map(path_to_fpath);
                diagnostics.diagnostic(Diagnostic::TraversalSkipped(path, err.to_string()));
                continue;
            }
        };
        let file_type = entry.file_type();
        filter_entry(root, entry.into_path(), file_type, filter, &mut paths);
    }

    paths
}

/// Walk `root` reading directories in parallel on `threads` threads.
fn walk_parallel(
    root: &Path,
    threads: usize,
    filter: &GlobFilter,
    diagnostics: &dyn DiagnosticSink,
) -> FPaths {
    let mut paths = FPaths::new();
    for entry in jwalk::WalkDir::new(root)
        .follow_links(true)
        .skip_hidden(false)
        .min_depth(1)
        .parallelism(jwalk::Parallelism::RayonNewPool(threads.max(1)))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                defo!("Err({:?})", err);
                let path: Option<FPath> = err.path().map(path_to_fpath);
                diagnostics.diagnostic(Diagnostic::TraversalSkipped(path, err.to_string()));
                continue;
            }
        };
        let file_type = entry.file_type();
        filter_entry(root, entry.path(), file_type, filter, &mut paths);
    }

    paths
}

/// Return every regular file under `root`, at any depth, whose
/// root-relative path matches any `include` glob and no `exclude` glob.
///
/// Unreadable directories and entries are skipped with a [`Diagnostic`].
/// The returned paths are sorted and unique.
pub fn enumerate_files(
    root: &FPath,
    include: &[String],
    exclude: &[String],
    parallel: bool,
    threads: usize,
    diagnostics: &dyn DiagnosticSink,
) -> Result<FPaths, ScanError> {
    defn!("({:?}, {:?}, {:?}, parallel {})", root, include, exclude, parallel);
    check_root(root)?;
    let filter = GlobFilter::new(include, exclude, diagnostics);
    let root_path: &Path = fpath_to_path(root);
    let mut paths: FPaths = match parallel {
        true => walk_parallel(root_path, threads, &filter, diagnostics),
        false => walk_sequential(root_path, &filter, diagnostics),
    };
    paths.sort_unstable();
    paths.dedup();
    defx!("{} files", paths.len());

    Ok(paths)
}
