// src/debug/helpers.rs

//! Miscellaneous helper functions for testing.

use crate::common::{path_to_fpath, FPath};

use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};

#[doc(hidden)]
pub use ::tempfile::NamedTempFile;
#[doc(hidden)]
pub use ::tempfile::TempDir;
use ::si_trace_print::defñ;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// NamedTempFile and TempDir instances default to this name prefix.
pub const STR_TEMPFILE_PREFIX: &str = "tmp-lws-test-";

/// Small helper function for copying `NamedTempFile` path to a `FPath`.
pub fn ntf_fpath(ntf: &NamedTempFile) -> FPath {
    path_to_fpath(ntf.path())
}

/// Testing helper function to write a `str` to a temporary file.
pub fn create_temp_file(data: &str) -> NamedTempFile {
    let mut ntf = match ::tempfile::Builder::new()
        .prefix(STR_TEMPFILE_PREFIX)
        .suffix(".log")
        .tempfile()
    {
        Ok(val) => val,
        Err(err) => {
            panic!("tempfile::Builder::tempfile() return Err {}", err);
        }
    };
    match ntf.write_all(data.as_bytes()) {
        Ok(_) => {}
        Err(err) => {
            panic!("NamedTempFile::write_all() return Err {}", err);
        }
    }

    ntf
}

/// Create a temporary directory.
pub fn create_temp_dir() -> TempDir {
    match ::tempfile::Builder::new()
        .prefix(STR_TEMPFILE_PREFIX)
        .tempdir()
    {
        Ok(val) => val,
        Err(err) => {
            panic!("tempfile::Builder::tempdir() return Err {}", err);
        }
    }
}

/// Write `data` to the file at relative path `relpath` under `tmpdir`,
/// creating intermediate directories.
/// Returns the full path of the created file.
pub fn create_file_in_tmpdir(
    tmpdir: &TempDir,
    relpath: &str,
    data: &str,
) -> FPath {
    let path: PathBuf = tmpdir.path().join(relpath);
    defñ!("({:?})", path);
    if let Some(parent) = path.parent() {
        if let Err(err) = create_dir_all(parent) {
            panic!("create_dir_all({:?}) return Err {}", parent, err);
        }
    }
    let mut file = match File::create(&path) {
        Ok(val) => val,
        Err(err) => {
            panic!("File::create({:?}) return Err {}", path, err);
        }
    };
    if let Err(err) = file.write_all(data.as_bytes()) {
        panic!("File::write_all({:?}) return Err {}", path, err);
    }

    path_to_fpath(&path)
}

/// Create a temporary directory filled with files at `relpaths`, each with
/// the paired contents.
pub fn create_files_and_tmpdir(files: &[(&str, &str)]) -> (TempDir, Vec<FPath>) {
    let tmpdir = create_temp_dir();
    let mut fpaths = Vec::<FPath>::with_capacity(files.len());
    for (relpath, data) in files.iter() {
        fpaths.push(create_file_in_tmpdir(&tmpdir, relpath, data));
    }

    (tmpdir, fpaths)
}

/// The `FPath` of a `TempDir`.
pub fn tmpdir_fpath(tmpdir: &TempDir) -> FPath {
    path_to_fpath(tmpdir.path())
}

/// `relpath` relative to `root` with `/` separators, for comparisons in
/// tests.
pub fn relative_fpath(
    root: &Path,
    fpath: &FPath,
) -> FPath {
    match Path::new(fpath).strip_prefix(root) {
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => fpath.clone(),
    }
}
