use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::debug;
use thiserror::Error;
use vitrine_fs::{identifier, list_dir};
use vitrine_runtime::{DEFAULT_MAX_WORKERS, Settings};
use vitrine_store::{FileRecord, MetadataStore, StoreError};

use crate::{
    ListingEntry, ObservedEntry, Reconciler,
    listing::sort_listing,
    pool::fan_out,
};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("directory not found: {0:?}")]
    NotFound(String),

    #[error("failed to read directory {path:?}: {source}")]
    Access {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    fn from_io(path: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ScanError::NotFound(path.to_owned())
        } else {
            ScanError::Access {
                path: path.to_owned(),
                source,
            }
        }
    }
}

/// Lists one directory below the served root at a time.
pub struct DirectoryScanner {
    root: PathBuf,
    max_workers: usize,
    reconciler: Reconciler,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>, reconciler: Reconciler, max_workers: usize) -> Self {
        let max_workers = if max_workers == 0 {
            DEFAULT_MAX_WORKERS
        } else {
            max_workers
        };

        Self {
            root: root.into(),
            max_workers,
            reconciler,
        }
    }

    /// Scanner with the default collaborators for `settings`.
    pub fn from_settings(settings: &Settings, store: Arc<dyn MetadataStore>) -> Self {
        let reconciler = Reconciler::new(&settings.thumbnail_root, store);
        Self::new(&settings.shared_root, reconciler, settings.max_workers)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Workers used for a directory with `entries` children.
    #[inline]
    pub fn worker_count(&self, entries: usize) -> usize {
        self.max_workers.min(entries)
    }

    /// List the children of `relative_path`, directories first, then by
    /// case-insensitive name.
    ///
    /// Only failures to read the directory itself are returned; problems
    /// with individual children degrade those entries instead.
    pub fn scan(&self, relative_path: &str) -> Result<Vec<ListingEntry>, ScanError> {
        let rel = normalize_relative(relative_path)
            .ok_or_else(|| ScanError::NotFound(relative_path.to_owned()))?;
        let abs = self.resolve(&rel);

        let children = list_dir(&abs).map_err(|e| ScanError::from_io(&rel, e))?;
        debug!("[scan] {:?}: {} entries", abs, children.len());

        Ok(self.reconcile_all(children, &rel, |entry| {
            ObservedEntry::from_dir_entry(&entry)
        }))
    }

    /// Stored row for `relative_path`, without touching the filesystem.
    ///
    /// A row recorded for a different path under the same identifier is
    /// reported as absent.
    pub fn lookup(&self, relative_path: &str) -> Result<Option<FileRecord>, StoreError> {
        let Some(rel) = normalize_relative(relative_path) else {
            return Ok(None);
        };

        match self.reconciler.store().get(identifier(&rel)) {
            Ok(record) if record.relative_path == rel => Ok(Some(record)),
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Absolute location of a normalized relative path.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    /// Reconcile every item on the bounded pool, then sort.
    ///
    /// `observe` runs on the worker so stat calls are spread across the pool
    /// as well.
    pub(crate) fn reconcile_all<T, F>(
        &self,
        items: Vec<T>,
        dir_rel: &str,
        observe: F,
    ) -> Vec<ListingEntry>
    where
        T: Send,
        F: Fn(T) -> ObservedEntry + Sync,
    {
        let workers = self.worker_count(items.len());

        let mut entries = fan_out(items, workers, |item| {
            self.reconciler.reconcile(&observe(item), dir_rel)
        });

        sort_listing(&mut entries);
        entries
    }
}

/// Canonical `/`-separated form of a client supplied path: backslashes
/// become slashes, empty and `.` segments are dropped. Paths that try to
/// leave the served root with `..` yield `None`.
pub fn normalize_relative(raw: &str) -> Option<String> {
    let unified = raw.replace('\\', "/");
    let mut segments = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s => segments.push(s),
        }
    }

    Some(segments.join("/"))
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
