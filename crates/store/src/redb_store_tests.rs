use super::*;
use crate::test_records::sample_record;

fn temp_store() -> (RedbStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = RedbStore::open(&dir.path().join("meta/files.redb")).expect("open store");
    (store, dir)
}

#[test]
fn open_creates_parent_dirs_and_empty_table() {
    let (store, dir) = temp_store();
    assert!(dir.path().join("meta/files.redb").is_file());

    let err = store.get(42).expect_err("empty table");
    assert!(err.is_not_found(), "got {err:?}");
}

#[test]
fn insert_get_update_cycle() {
    let (store, _dir) = temp_store();
    let mut rec = sample_record("videos/clip.mp4");

    store.insert(&rec).expect("insert");
    assert_eq!(store.get(rec.id).expect("get"), rec);

    rec.modified_secs += 60;
    rec.size = 2048;
    store.update(&rec).expect("update");
    assert_eq!(store.get(rec.id).expect("get after update"), rec);
}

#[test]
fn insert_duplicate_keeps_original_row() {
    let (store, _dir) = temp_store();
    let rec = sample_record("videos/clip.mp4");
    store.insert(&rec).expect("insert");

    let mut other = rec.clone();
    other.size = 1;
    let err = store.insert(&other).expect_err("duplicate");

    assert!(matches!(err, StoreError::Duplicate(_)), "got {err:?}");
    assert_eq!(store.get(rec.id).expect("get").size, rec.size);
}

#[test]
fn update_missing_row_is_not_found_and_writes_nothing() {
    let (store, _dir) = temp_store();
    let rec = sample_record("docs/readme.md");

    let err = store.update(&rec).expect_err("update missing");
    assert!(err.is_not_found());
    assert!(store.get(rec.id).expect_err("still missing").is_not_found());
}

#[test]
fn rows_survive_reopen() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("files.redb");
    let rec = sample_record("music/track.flac");

    {
        let store = RedbStore::open(&path).expect("open");
        store.insert(&rec).expect("insert");
    }

    let store = RedbStore::open(&path).expect("reopen");
    assert_eq!(store.get(rec.id).expect("get after reopen"), rec);
}

#[test]
fn decode_rejects_unknown_version() {
    let rec = sample_record("a.txt");
    let mut bytes = encode_record(&rec).expect("encode");
    assert_eq!(bytes[0], crate::RECORD_VERSION);

    bytes[0] = 9;
    assert!(matches!(decode_record(&bytes), Err(StoreError::Version(9))));
    assert!(matches!(decode_record(&[]), Err(StoreError::Version(0))));
}
