use std::fmt;

use log::{debug, warn};

use crate::Staleness;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Get,
    Insert,
    Update,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOp::Get => "get",
            StoreOp::Insert => "insert",
            StoreOp::Update => "update",
        })
    }
}

/// Notable outcomes of reconciling one entry. `path` is always the
/// served-relative path of the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Stored metadata reused without recomputation
    CacheHit { path: String },
    /// Stored metadata rejected by the freshness test
    Stale { path: String, reasons: Staleness },
    /// Size, MIME type and thumbnail derived from disk
    Recomputed { path: String },
    /// Entry could not be stat'ed; it is listed with empty fields
    StatFailed { path: String, error: String },
    /// Metadata store failure, treated as a cache miss
    StoreFault {
        path: String,
        op: StoreOp,
        error: String,
    },
    MimeFailed { path: String, error: String },
    ThumbnailFailed { path: String, error: String },
    /// Some subpaths of a directory were unreadable
    PartialDirSize { path: String, unreadable: usize },
}

/// Sink for degraded-path and cache events.
pub trait Observer: Send + Sync {
    fn observe(&self, event: ScanEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn observe(&self, event: ScanEvent) {
        match event {
            ScanEvent::CacheHit { path } => debug!("[reconcile] {path}: cache hit"),
            ScanEvent::Stale { path, reasons } => {
                debug!("[reconcile] {path} is outdated ({reasons:?}), updating")
            }
            ScanEvent::Recomputed { path } => debug!("[reconcile] {path}: recomputed"),
            ScanEvent::StatFailed { path, error } => {
                warn!("[reconcile] stat failed for {path}: {error}")
            }
            ScanEvent::StoreFault { path, op, error } => {
                warn!("[reconcile] store {op} failed for {path}: {error}")
            }
            ScanEvent::MimeFailed { path, error } => {
                warn!("[reconcile] MIME detection failed for {path}: {error}")
            }
            ScanEvent::ThumbnailFailed { path, error } => {
                warn!("[reconcile] thumbnail generation failed for {path}: {error}")
            }
            ScanEvent::PartialDirSize { path, unreadable } => {
                warn!("[reconcile] size of {path} is partial, {unreadable} subpaths unreadable")
            }
        }
    }
}
