use std::{
    fs::{self, read_dir},
    io::Result,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, warn};

use crate::record::EntryFacts;

/// Best-effort aggregate size of a directory tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirSize {
    /// Sum of the sizes of every regular file reached
    pub bytes: u64,
    /// Number of subpaths that could not be read
    pub errors: usize,
}

impl DirSize {
    #[inline]
    pub fn is_partial(&self) -> bool {
        self.errors > 0
    }
}

/// Immediate children of `dir`.
///
/// Failing to open `dir` is returned to the caller; failures on individual
/// entries while iterating are logged and skipped.
pub fn list_dir(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = Vec::new();

    for entry_res in read_dir(dir)? {
        match entry_res {
            Ok(e) => entries.push(e),
            Err(e) => warn!("[list] error reading entry in {:?}: {e}", dir),
        }
    }

    Ok(entries)
}

/// Stat a directory entry without following symlinks.
pub fn inspect_entry(entry: &fs::DirEntry) -> Result<EntryFacts> {
    let metadata = entry.metadata()?;

    let is_dir = metadata.is_dir();
    let size = if is_dir { 0 } else { metadata.len() };

    Ok(EntryFacts {
        size,
        mtime_secs: to_unix_secs(metadata.modified().ok()),
        is_dir,
    })
}

/// Display name of an entry. Names that are not valid UTF-8 are converted
/// lossily so the entry can still be listed.
pub fn entry_name(entry: &fs::DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

/// Sum the sizes of all regular files below `root`.
///
/// Symbolic links are never followed nor counted, which also keeps link
/// cycles out of the walk. Unreadable subpaths are skipped and counted in
/// [`DirSize::errors`]; the walk always runs to completion.
pub fn dir_size(root: &Path) -> DirSize {
    let mut total = DirSize::default();
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(path) = stack.pop() {
        if let Err(e) = visit_path(&path, &mut stack, &mut total) {
            debug!("[dir_size] skipping {:?}: {e}", path);
            total.errors += 1;
        }
    }

    total
}

fn visit_path(path: &Path, stack: &mut Vec<PathBuf>, total: &mut DirSize) -> Result<()> {
    let metadata = fs::symlink_metadata(path)?;

    if metadata.file_type().is_symlink() {
        return Ok(());
    }

    if metadata.is_dir() {
        for entry_res in read_dir(path)? {
            match entry_res {
                Ok(entry) => stack.push(entry.path()),
                Err(e) => {
                    debug!("[dir_size] error reading entry in {:?}: {e}", path);
                    total.errors += 1;
                }
            }
        }
    } else if metadata.is_file() {
        total.bytes += metadata.len();
    }

    Ok(())
}

pub fn to_unix_secs(t: Option<SystemTime>) -> u64 {
    t.and_then(|tt| tt.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Current wall clock in unix seconds.
pub fn now_secs() -> u64 {
    to_unix_secs(Some(SystemTime::now()))
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
