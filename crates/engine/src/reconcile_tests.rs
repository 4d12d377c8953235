use super::*;

use crate::{Staleness, test_support::Fixture};

fn record_for(fx: &Fixture, rel: &str, is_dir: bool, size: u64, modified_secs: u64) -> FileRecord {
    let name = rel.rsplit('/').next().unwrap_or(rel);
    FileRecord {
        id: identifier(rel),
        name: name.to_owned(),
        size,
        is_dir,
        mime_type: None,
        path: fx.abs(rel),
        relative_path: rel.to_owned(),
        thumbnail_path: None,
        thumbnail_relative_path: None,
        modified_secs,
        accessed_secs: 0,
    }
}

#[test]
fn join_relative_at_root_and_below() {
    assert_eq!(join_relative("", "a.mp4"), "a.mp4");
    assert_eq!(join_relative("videos", "a.mp4"), "videos/a.mp4");
    assert_eq!(join_relative("videos/2024", "a.mp4"), "videos/2024/a.mp4");
}

#[test]
fn first_reconcile_inserts_and_second_is_a_pure_hit() {
    let fx = Fixture::new();
    fx.write("notes.txt", b"hello");
    fx.set_mtime("notes.txt", 1_700_000_000);
    let r = fx.reconciler();

    let first = r.reconcile(&fx.observe("", "notes.txt"), "");
    assert_eq!(fx.store.inserts(), 1);
    assert_eq!(fx.sniffer.calls(), 1);

    let second = r.reconcile(&fx.observe("", "notes.txt"), "");

    assert_eq!(first, second);
    assert_eq!(fx.store.writes(), 1, "a hit must not write");
    assert_eq!(fx.sniffer.calls(), 1, "a hit must not sniff");
    assert_eq!(fx.observer.recomputed(), 1);
    assert_eq!(
        fx.observer.count(|e| matches!(e, ScanEvent::CacheHit { .. })),
        1
    );
}

#[test]
fn miss_fills_every_field_from_disk() {
    let fx = Fixture::new();
    fx.write("docs/readme.txt", b"0123456789");
    fx.set_mtime("docs/readme.txt", 1_650_000_000);

    let entry = fx.reconciler().reconcile(&fx.observe("docs", "readme.txt"), "docs");

    assert_eq!(entry.id, identifier("docs/readme.txt"));
    assert_eq!(entry.name, "readme.txt");
    assert_eq!(entry.path, "docs/readme.txt");
    assert_eq!(entry.size, 10);
    assert!(!entry.is_dir);
    assert_eq!(entry.mime_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(entry.thumbnail, None);
    assert_eq!(entry.modified_secs, 1_650_000_000);
    assert_eq!(entry.url, None);

    let row = fx.store.row(entry.id).expect("row written");
    assert_eq!(row.relative_path, "docs/readme.txt");
    assert_eq!(row.path, fx.abs("docs/readme.txt"));
    assert_eq!(row.size, 10);
    assert_eq!(row.modified_secs, 1_650_000_000);
    assert!(row.accessed_secs > 0);
}

#[test]
fn changed_mtime_updates_the_existing_row() {
    let fx = Fixture::new();
    fx.write("clip.txt", b"v1");
    fx.set_mtime("clip.txt", 1_000);
    let r = fx.reconciler();

    r.reconcile(&fx.observe("", "clip.txt"), "");
    fx.set_mtime("clip.txt", 2_000);
    let entry = r.reconcile(&fx.observe("", "clip.txt"), "");

    assert_eq!(entry.modified_secs, 2_000);
    assert_eq!(fx.store.inserts(), 1);
    assert_eq!(fx.store.updates(), 1, "stale rows are updated, never re-inserted");
    assert_eq!(fx.sniffer.calls(), 2);
    assert_eq!(fx.store.row(entry.id).unwrap().modified_secs, 2_000);
    assert_eq!(
        fx.observer.count(|e| matches!(
            e,
            ScanEvent::Stale { reasons, .. } if reasons.contains(Staleness::MODIFIED)
        )),
        1
    );
}

#[test]
fn changed_size_with_same_mtime_is_stale() {
    let fx = Fixture::new();
    fx.write("data.txt", b"short");
    fx.set_mtime("data.txt", 5_000);
    fx.store.seed(&record_for(&fx, "data.txt", false, 999, 5_000));

    let entry = fx
        .reconciler()
        .reconcile(&fx.observe("", "data.txt"), "");

    assert_eq!(entry.size, 5);
    assert_eq!(fx.store.updates(), 1);
    assert_eq!(fx.store.inserts(), 0);
}

#[test]
fn directory_miss_aggregates_and_hit_reuses_stored_size() {
    let fx = Fixture::new();
    fx.write("Docs/a.bin", &[0u8; 100]);
    fx.write("Docs/deep/b.bin", &[0u8; 23]);
    fx.set_mtime("Docs", 1_234);
    let r = fx.reconciler();

    let first = r.reconcile(&fx.observe("", "Docs"), "");
    assert!(first.is_dir);
    assert_eq!(first.size, 123);
    assert_eq!(first.mime_type, None);
    assert_eq!(fx.sniffer.calls(), 0, "directories are never sniffed");

    // Growing a nested file leaves the directory mtime alone.
    fx.write("Docs/deep/b.bin", &[0u8; 500]);
    fx.set_mtime("Docs", 1_234);

    let second = r.reconcile(&fx.observe("", "Docs"), "");
    assert_eq!(second.size, 123, "cached aggregate wins on a hit");
    assert_eq!(fx.store.writes(), 1);
}

#[test]
fn stored_directory_size_is_served_from_cache() {
    let fx = Fixture::new();
    fx.mkdir("videos/Docs");
    fx.set_mtime("videos/Docs", 1_700_000_000);
    fx.store
        .seed(&record_for(&fx, "videos/Docs", true, 12_345, 1_700_000_000));

    let entry = fx.reconciler().reconcile(&fx.observe("videos", "Docs"), "videos");

    assert!(entry.is_dir);
    assert_eq!(entry.size, 12_345);
    assert_eq!(fx.store.writes(), 0);
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_directory_is_measured_through_its_real_path() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    let fx = Fixture::new();
    let raw = OsStr::from_bytes(b"sub\xfe");
    let dir = fx.abs("v").join(raw);
    fs::create_dir_all(&dir).expect("create dir");
    fs::write(dir.join("inner.bin"), [0u8; 1000]).expect("write inner");

    let entry = fx.reconciler().reconcile(&fx.observe("v", raw), "v");

    assert_eq!(entry.name, "sub\u{fffd}");
    assert!(entry.is_dir);
    assert_eq!(entry.size, 1000);
    assert_eq!(
        fx.observer.count(|e| matches!(e, ScanEvent::PartialDirSize { .. })),
        0
    );

    let row = fx.store.row(entry.id).expect("row written");
    assert_eq!(row.path, dir);
    assert!(row.path.is_dir());
}

#[test]
fn video_gets_a_thumbnail_under_the_thumbnail_root() {
    let fx = Fixture::new();
    fx.write("videos/a.mp4", b"\0\0\0\x18ftypmp42");

    let entry = fx.reconciler().reconcile(&fx.observe("videos", "a.mp4"), "videos");

    assert_eq!(entry.mime_type.as_deref(), Some("video/mp4"));
    assert_eq!(entry.thumbnail.as_deref(), Some("videos/a.webp"));
    assert!(fx.thumbs.path().join("videos/a.webp").is_file());
    assert_eq!(fx.thumbnailer.calls(), 1);

    let row = fx.store.row(entry.id).unwrap();
    assert_eq!(row.thumbnail_relative_path.as_deref(), Some("videos/a.webp"));
    assert_eq!(
        row.thumbnail_path.as_deref(),
        Some(fx.thumbs.path().join("videos/a.webp").as_path())
    );
}

#[test]
fn non_video_never_calls_the_thumbnailer() {
    let fx = Fixture::new();
    fx.write("cover.png", b"\x89PNG");

    let entry = fx
        .reconciler()
        .reconcile(&fx.observe("", "cover.png"), "");

    assert_eq!(entry.mime_type.as_deref(), Some("image/png"));
    assert_eq!(entry.thumbnail, None);
    assert_eq!(fx.thumbnailer.calls(), 0);
}

#[test]
fn thumbnail_failure_keeps_the_mime_type() {
    let fx = Fixture::new();
    fx.thumbnailer.fail(true);
    fx.write("broken.mkv", b"not really a video");

    let entry = fx
        .reconciler()
        .reconcile(&fx.observe("", "broken.mkv"), "");

    assert_eq!(entry.mime_type.as_deref(), Some("video/x-matroska"));
    assert_eq!(entry.thumbnail, None);
    assert_eq!(fx.store.inserts(), 1);
    assert_eq!(
        fx.observer
            .count(|e| matches!(e, ScanEvent::ThumbnailFailed { path, .. } if path == "broken.mkv")),
        1
    );
}

#[test]
fn mime_failure_leaves_type_empty_but_still_records() {
    let fx = Fixture::new();
    fx.write("weird.bad", b"??");

    let entry = fx
        .reconciler()
        .reconcile(&fx.observe("", "weird.bad"), "");

    assert_eq!(entry.mime_type, None);
    assert_eq!(entry.size, 2);
    assert_eq!(fx.store.inserts(), 1);
    assert_eq!(
        fx.observer.count(|e| matches!(e, ScanEvent::MimeFailed { .. })),
        1
    );
}

#[test]
fn stat_failure_yields_degraded_entry_without_store_access() {
    let fx = Fixture::new();
    let observed = ObservedEntry {
        name: "vanished.mp4".into(),
        path: fx.abs("videos/vanished.mp4"),
        facts: Err(io::Error::from(io::ErrorKind::PermissionDenied)),
    };

    let entry = fx
        .reconciler()
        .reconcile(&observed, "videos");

    assert_eq!(entry.name, "vanished.mp4");
    assert_eq!(entry.path, "videos/vanished.mp4");
    assert_eq!(entry.id, identifier("videos/vanished.mp4"));
    assert_eq!(entry.size, 0);
    assert_eq!(entry.mime_type, None);
    assert_eq!(entry.modified_secs, 0);
    assert_eq!(fx.store.writes(), 0);
    assert_eq!(
        fx.observer.count(|e| matches!(e, ScanEvent::StatFailed { .. })),
        1
    );
}

#[test]
fn store_lookup_fault_recomputes_without_writing() {
    let fx = Fixture::new();
    fx.store.fail_gets(true);
    fx.write("a.txt", b"abc");

    let entry = fx
        .reconciler()
        .reconcile(&fx.observe("", "a.txt"), "");

    assert_eq!(entry.size, 3);
    assert!(entry.mime_type.is_some());
    assert_eq!(fx.store.writes(), 0);
    assert_eq!(
        fx.observer.count(|e| matches!(
            e,
            ScanEvent::StoreFault { op: StoreOp::Get, .. }
        )),
        1
    );
}

#[test]
fn colliding_row_is_replaced_by_the_current_path() {
    let fx = Fixture::new();
    fx.write("a.txt", b"abc");
    fx.set_mtime("a.txt", 42);

    // Same identifier, recorded for another path.
    let mut foreign = record_for(&fx, "elsewhere/a.txt", false, 3, 42);
    foreign.id = identifier("a.txt");
    fx.store.seed(&foreign);

    let entry = fx
        .reconciler()
        .reconcile(&fx.observe("", "a.txt"), "");

    assert_eq!(entry.path, "a.txt");
    assert_eq!(fx.store.updates(), 1);
    assert_eq!(fx.store.row(entry.id).unwrap().relative_path, "a.txt");
    assert_eq!(
        fx.observer.count(|e| matches!(
            e,
            ScanEvent::Stale { reasons, .. } if reasons.contains(Staleness::COLLISION)
        )),
        1
    );
}

#[test]
fn hit_reports_stored_mime_and_thumbnail() {
    let fx = Fixture::new();
    fx.write("videos/b.mp4", b"video bytes");
    fx.set_mtime("videos/b.mp4", 77);

    let mut stored = record_for(&fx, "videos/b.mp4", false, 11, 77);
    stored.mime_type = Some("video/mp4".into());
    stored.thumbnail_relative_path = Some("videos/b.webp".into());
    fx.store.seed(&stored);

    let entry = fx.reconciler().reconcile(&fx.observe("videos", "b.mp4"), "videos");

    assert_eq!(entry.mime_type.as_deref(), Some("video/mp4"));
    assert_eq!(entry.thumbnail.as_deref(), Some("videos/b.webp"));
    assert_eq!(fx.sniffer.calls(), 0);
    assert_eq!(fx.thumbnailer.calls(), 0);
    assert_eq!(
        fx.observer.events(),
        vec![ScanEvent::CacheHit {
            path: "videos/b.mp4".into()
        }]
    );
}
