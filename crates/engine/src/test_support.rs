//! Fakes shared by the engine tests.

use std::{
    ffi::OsStr,
    fs::{self, File},
    io,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, UNIX_EPOCH},
};

use tempfile::TempDir;
use vitrine_fs::{FileId, MimeError, MimeSniffer, ThumbnailError, Thumbnailer, list_dir};
use vitrine_store::{FileRecord, MemoryStore, MetadataStore, StoreError};

use crate::{DirectoryScanner, ObservedEntry, Observer, Reconciler, ScanEvent};

/// Counts calls and can be told to fail lookups.
#[derive(Default)]
pub(crate) struct SpyStore {
    inner: MemoryStore,
    gets: AtomicUsize,
    inserts: AtomicUsize,
    updates: AtomicUsize,
    fail_gets: AtomicBool,
}

impl SpyStore {
    /// Put a row in place without counting it as a write.
    pub(crate) fn seed(&self, record: &FileRecord) {
        self.inner.insert(record).expect("seed record");
    }

    pub(crate) fn row(&self, id: FileId) -> Option<FileRecord> {
        self.inner.get(id).ok()
    }

    pub(crate) fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub(crate) fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub(crate) fn writes(&self) -> usize {
        self.inserts() + self.updates()
    }
}

impl MetadataStore for SpyStore {
    fn get(&self, id: FileId) -> Result<FileRecord, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(StoreError::Version(0xff));
        }
        self.inner.get(id)
    }

    fn insert(&self, record: &FileRecord) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(record)
    }

    fn update(&self, record: &FileRecord) -> Result<(), StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(record)
    }
}

/// Sniffs by extension, counts calls and tracks overlapping calls.
#[derive(Default)]
pub(crate) struct ExtensionSniffer {
    calls: AtomicUsize,
    current: AtomicUsize,
    peak: AtomicUsize,
    delay: Mutex<Duration>,
}

impl ExtensionSniffer {
    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl MimeSniffer for ExtensionSniffer {
    fn detect(&self, path: &Path) -> Result<String, MimeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.current.fetch_sub(1, Ordering::SeqCst);

        match path.extension().and_then(|e| e.to_str()) {
            Some("mp4") => Ok("video/mp4".to_owned()),
            Some("mkv") => Ok("video/x-matroska".to_owned()),
            Some("png") => Ok("image/png".to_owned()),
            Some("bad") => Err(MimeError::Read {
                path: path.display().to_string(),
                source: io::Error::other("unreadable"),
            }),
            _ => Ok("text/plain; charset=utf-8".to_owned()),
        }
    }
}

/// Writes a placeholder image, or fails on demand.
#[derive(Default)]
pub(crate) struct FakeThumbnailer {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl FakeThumbnailer {
    pub(crate) fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Thumbnailer for FakeThumbnailer {
    fn generate(&self, _source: &Path, destination: &Path) -> Result<(), ThumbnailError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ThumbnailError::Probe("no video stream".into()));
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        if !destination.exists() {
            fs::write(destination, b"RIFF....WEBP")?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<ScanEvent>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<ScanEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&ScanEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(*e)).count()
    }

    pub(crate) fn recomputed(&self) -> usize {
        self.count(|e| matches!(e, ScanEvent::Recomputed { .. }))
    }

    pub(crate) fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, event: ScanEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Served root and thumbnail root on disk plus all fakes.
pub(crate) struct Fixture {
    pub(crate) served: TempDir,
    pub(crate) thumbs: TempDir,
    pub(crate) store: Arc<SpyStore>,
    pub(crate) sniffer: Arc<ExtensionSniffer>,
    pub(crate) thumbnailer: Arc<FakeThumbnailer>,
    pub(crate) observer: Arc<RecordingObserver>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self {
            served: tempfile::tempdir().expect("served root"),
            thumbs: tempfile::tempdir().expect("thumbnail root"),
            store: Arc::default(),
            sniffer: Arc::default(),
            thumbnailer: Arc::default(),
            observer: Arc::default(),
        }
    }

    pub(crate) fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.thumbs.path(), self.store.clone())
            .with_sniffer(self.sniffer.clone())
            .with_thumbnailer(self.thumbnailer.clone())
            .with_observer(self.observer.clone())
    }

    pub(crate) fn scanner(&self, max_workers: usize) -> DirectoryScanner {
        DirectoryScanner::new(self.served.path(), self.reconciler(), max_workers)
    }

    pub(crate) fn abs(&self, rel: &str) -> std::path::PathBuf {
        self.served.path().join(rel)
    }

    pub(crate) fn write(&self, rel: &str, bytes: &[u8]) {
        let path = self.abs(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, bytes).expect("write file");
    }

    pub(crate) fn mkdir(&self, rel: &str) {
        fs::create_dir_all(self.abs(rel)).expect("create dir");
    }

    /// Pin the mtime of a file or directory.
    pub(crate) fn set_mtime(&self, rel: &str, secs: u64) {
        let file = File::open(self.abs(rel)).expect("open for mtime");
        file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
            .expect("set mtime");
    }

    /// Stat one child of `dir_rel` the way a scan would.
    pub(crate) fn observe(&self, dir_rel: &str, name: impl AsRef<OsStr>) -> ObservedEntry {
        list_dir(&self.abs(dir_rel))
            .expect("list dir")
            .iter()
            .find(|e| e.file_name().as_os_str() == name.as_ref())
            .map(ObservedEntry::from_dir_entry)
            .expect("child present")
    }
}
