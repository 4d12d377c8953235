use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use vitrine_fs::{
    ContentSniffer, EntryFacts, FfmpegThumbnailer, MimeSniffer, Thumbnailer, dir_size,
    entry_name, identifier, inspect_entry, is_video, now_secs, thumbnail_relative_path,
};
use vitrine_store::{FileRecord, MetadataStore, StoreError};

use crate::{
    ListingEntry, LogObserver, Observer, ScanEvent, StoreOp,
    freshness::staleness,
};

/// A directory child together with the outcome of its stat call.
///
/// `name` is the display form and may be lossy; `path` is the child as the
/// filesystem knows it and is what gets read.
#[derive(Debug)]
pub struct ObservedEntry {
    pub name: String,
    pub path: PathBuf,
    pub facts: io::Result<EntryFacts>,
}

impl ObservedEntry {
    pub fn from_dir_entry(entry: &fs::DirEntry) -> Self {
        Self {
            name: entry_name(entry),
            path: entry.path(),
            facts: inspect_entry(entry),
        }
    }
}

/// What the store held for an identifier before recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prior {
    Absent,
    Stale,
    /// The lookup itself failed
    Unknown,
}

/// Decides per entry whether stored metadata can be reused and refreshes
/// the store when it cannot.
pub struct Reconciler {
    thumbnail_root: PathBuf,
    store: Arc<dyn MetadataStore>,
    sniffer: Arc<dyn MimeSniffer>,
    thumbnailer: Arc<dyn Thumbnailer>,
    observer: Arc<dyn Observer>,
}

impl Reconciler {
    /// Reconciler using content sniffing, ffmpeg thumbnails and log output.
    pub fn new(thumbnail_root: impl Into<PathBuf>, store: Arc<dyn MetadataStore>) -> Self {
        Self {
            thumbnail_root: thumbnail_root.into(),
            store,
            sniffer: Arc::new(ContentSniffer),
            thumbnailer: Arc::new(FfmpegThumbnailer::new()),
            observer: Arc::new(LogObserver),
        }
    }

    pub fn with_sniffer(mut self, sniffer: Arc<dyn MimeSniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    pub fn with_thumbnailer(mut self, thumbnailer: Arc<dyn Thumbnailer>) -> Self {
        self.thumbnailer = thumbnailer;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn thumbnail_root(&self) -> &Path {
        &self.thumbnail_root
    }

    pub fn store(&self) -> &dyn MetadataStore {
        self.store.as_ref()
    }

    /// Produce the listing entry for one child of the directory at `dir_rel`.
    ///
    /// Never fails: stat, store, MIME and thumbnail problems are reported to
    /// the observer and leave the affected fields empty.
    pub fn reconcile(&self, entry: &ObservedEntry, dir_rel: &str) -> ListingEntry {
        let path = join_relative(dir_rel, &entry.name);
        let mut listing = ListingEntry::bare(identifier(&path), entry.name.clone(), path);

        let facts = match &entry.facts {
            Ok(facts) => facts,
            Err(e) => {
                self.observer.observe(ScanEvent::StatFailed {
                    path: listing.path.clone(),
                    error: e.to_string(),
                });
                return listing;
            }
        };

        listing.size = facts.size;
        listing.is_dir = facts.is_dir;
        listing.modified_secs = facts.mtime_secs;

        let prior = match self.store.get(listing.id) {
            Ok(stored) => {
                let reasons = staleness(&stored, &listing);
                if reasons.is_empty() {
                    reuse(&mut listing, stored);
                    self.observer.observe(ScanEvent::CacheHit {
                        path: listing.path.clone(),
                    });
                    return listing;
                }

                self.observer.observe(ScanEvent::Stale {
                    path: listing.path.clone(),
                    reasons,
                });
                Prior::Stale
            }
            Err(e) if e.is_not_found() => Prior::Absent,
            Err(e) => {
                self.report_store_fault(&listing.path, StoreOp::Get, &e);
                Prior::Unknown
            }
        };

        let thumbnail_path = self.recompute(&mut listing, &entry.path);
        self.observer.observe(ScanEvent::Recomputed {
            path: listing.path.clone(),
        });

        let record = FileRecord {
            id: listing.id,
            name: listing.name.clone(),
            size: listing.size,
            is_dir: listing.is_dir,
            mime_type: listing.mime_type.clone(),
            path: entry.path.clone(),
            relative_path: listing.path.clone(),
            thumbnail_path,
            thumbnail_relative_path: listing.thumbnail.clone(),
            modified_secs: listing.modified_secs,
            accessed_secs: now_secs(),
        };

        match prior {
            Prior::Stale => {
                if let Err(e) = self.store.update(&record) {
                    self.report_store_fault(&listing.path, StoreOp::Update, &e);
                }
            }
            Prior::Absent => {
                if let Err(e) = self.store.insert(&record) {
                    self.report_store_fault(&listing.path, StoreOp::Insert, &e);
                }
            }
            // Whether a row exists is unknown; writing could clobber it.
            Prior::Unknown => {}
        }

        listing
    }

    /// Derive size, MIME type and thumbnail from disk. Returns the absolute
    /// thumbnail path when one was produced.
    fn recompute(&self, listing: &mut ListingEntry, abs: &Path) -> Option<PathBuf> {
        if listing.is_dir {
            let size = dir_size(abs);
            if size.is_partial() {
                self.observer.observe(ScanEvent::PartialDirSize {
                    path: listing.path.clone(),
                    unreadable: size.errors,
                });
            }
            listing.size = size.bytes;
            return None;
        }

        let mime = match self.sniffer.detect(abs) {
            Ok(mime) => mime,
            Err(e) => {
                self.observer.observe(ScanEvent::MimeFailed {
                    path: listing.path.clone(),
                    error: e.to_string(),
                });
                return None;
            }
        };

        let thumbnail_path = if is_video(&mime) {
            self.generate_thumbnail(listing, abs)
        } else {
            None
        };

        listing.mime_type = Some(mime);
        thumbnail_path
    }

    fn generate_thumbnail(&self, listing: &mut ListingEntry, abs: &Path) -> Option<PathBuf> {
        let relative = thumbnail_relative_path(&listing.path);
        let destination = self.thumbnail_root.join(&relative);

        match self.thumbnailer.generate(abs, &destination) {
            Ok(()) => {
                listing.thumbnail = Some(relative);
                Some(destination)
            }
            Err(e) => {
                self.observer.observe(ScanEvent::ThumbnailFailed {
                    path: listing.path.clone(),
                    error: e.to_string(),
                });
                None
            }
        }
    }

    fn report_store_fault(&self, path: &str, op: StoreOp, e: &StoreError) {
        self.observer.observe(ScanEvent::StoreFault {
            path: path.to_owned(),
            op,
            error: e.to_string(),
        });
    }
}

fn reuse(listing: &mut ListingEntry, stored: FileRecord) {
    listing.size = stored.size;
    listing.mime_type = stored.mime_type;
    listing.thumbnail = stored.thumbnail_relative_path;
    listing.modified_secs = stored.modified_secs;
}

/// `dir/name`, or just `name` at the served root.
pub fn join_relative(dir_rel: &str, name: &str) -> String {
    if dir_rel.is_empty() {
        name.to_owned()
    } else {
        format!("{dir_rel}/{name}")
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
