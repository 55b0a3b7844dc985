//! Snapshot persistence scenarios for the record store.

use casebook_rs_registry::PersonRecord;
use casebook_rs_test_utils::offline_store;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

/// A saved collection reloads with the same order and field values.
#[test]
fn round_trip_preserves_collection() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cases.bin");
    fs::write(&path, b"").expect("touch");

    let mut store = offline_store();
    let mut infected = PersonRecord::create("Carla", "hypertension", false).expect("create");
    infected.mark_infected();
    assert!(store.add_record(PersonRecord::create("Ana", "", false).expect("create")));
    let bruno = PersonRecord::create("Bruno", "asthma", true).expect("create");
    assert!(store.add_record(bruno));
    assert!(store.add_record(infected));
    assert!(store.save_snapshot(&path).expect("save"));

    let mut reloaded = offline_store();
    assert!(reloaded.load_snapshot(&path).expect("load"));
    assert_eq!(reloaded.records(), store.records());
}

/// Saving into an existing empty file and reloading yields the one record.
#[test]
fn bruno_reloads_from_existing_empty_file() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("Tp2.bin");
    fs::write(&path, b"").expect("touch");

    let mut store = offline_store();
    assert!(store.add_record(PersonRecord::create("Bruno", "", false).expect("create")));
    assert!(store.save_snapshot(&path).expect("save"));

    let mut fresh = offline_store();
    assert!(fresh.load_snapshot(&path).expect("load"));
    assert_eq!(fresh.len(), 1);
    let bruno = &fresh.records()[0];
    assert_eq!(bruno.name(), "Bruno");
    assert_eq!(bruno.condition(), "");
    assert!(!bruno.is_infected());
}

/// Saving to a path that does not exist reports false and creates nothing.
#[test]
fn save_never_creates_files() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("absent.bin");
    let mut store = offline_store();
    store.add_record(PersonRecord::create("Ana", "", false).expect("create"));

    assert!(!store.save_snapshot(&path).expect("save"));
    assert!(!path.exists());
    let leftovers = fs::read_dir(temp.path()).expect("read dir").count();
    assert_eq!(leftovers, 0);
}

/// A directory is not a valid save target either.
#[test]
fn save_rejects_directories() {
    let temp = tempdir().expect("tempdir");
    let store = offline_store();
    assert!(!store.save_snapshot(temp.path()).expect("save"));
}

/// Overwriting replaces previous contents entirely.
#[test]
fn save_overwrites_previous_snapshot() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cases.bin");
    fs::write(&path, vec![0xAB; 4096]).expect("fill");

    let mut store = offline_store();
    store.add_record(PersonRecord::create("Ana", "", false).expect("create"));
    assert!(store.save_snapshot(&path).expect("save"));

    let mut reloaded = offline_store();
    assert!(reloaded.load_snapshot(&path).expect("load"));
    assert_eq!(reloaded.records(), store.records());
    assert!(!temp.path().join("cases.bin.tmp").exists());
}

/// Loading an unreadable snapshot fails and keeps the previous records.
#[test]
fn corrupt_snapshot_is_reported() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cases.bin");
    fs::write(&path, b"CASEBOOK\x05\x00").expect("write");

    let mut store = offline_store();
    store.add_record(PersonRecord::create("Ana", "", false).expect("create"));
    let err = store.load_snapshot(&path).unwrap_err();
    assert!(format!("{err}").contains("invalid snapshot"));
    assert_eq!(store.len(), 1);
}

/// Records created after a load never reuse a loaded identifier.
#[test]
fn ids_stay_unique_after_load() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cases.bin");
    fs::write(&path, b"").expect("touch");

    let date = chrono::NaiveDate::from_ymd_opt(2021, 5, 26).expect("date");
    let mut store = offline_store();
    let old = PersonRecord::restore(5_000_000, "Old", "", false, date).expect("restore");
    store.add_record(old);
    assert!(store.save_snapshot(&path).expect("save"));

    let mut reloaded = offline_store();
    assert!(reloaded.load_snapshot(&path).expect("load"));
    let fresh = PersonRecord::create("New", "", false).expect("create");
    assert!(fresh.id() > 5_000_000);
    assert!(reloaded.add_record(fresh));
    let mut ids: Vec<u64> = reloaded.records().iter().map(|r| r.id()).collect();
    ids.dedup();
    assert_eq!(ids.len(), 2);
}

/// Saving through a symlink rewrites the linked file and keeps the link.
#[cfg(unix)]
#[test]
fn save_through_symlink_writes_target() {
    let temp = tempdir().expect("tempdir");
    let target = temp.path().join("cases.bin");
    let link = temp.path().join("current.bin");
    fs::write(&target, b"").expect("touch");
    std::os::unix::fs::symlink(&target, &link).expect("symlink");

    let mut store = offline_store();
    store.add_record(PersonRecord::create("Ana", "", false).expect("create"));
    assert!(store.save_snapshot(&link).expect("save"));

    let link_meta = fs::symlink_metadata(&link).expect("link metadata");
    assert!(link_meta.file_type().is_symlink());
    let mut reloaded = offline_store();
    assert!(reloaded.load_snapshot(&target).expect("load"));
    assert_eq!(reloaded.records(), store.records());
}

/// The rewritten snapshot keeps the permissions of the existing file.
#[cfg(unix)]
#[test]
fn save_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cases.bin");
    fs::write(&path, b"").expect("touch");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).expect("chmod");

    let mut store = offline_store();
    store.add_record(PersonRecord::create("Ana", "", false).expect("create"));
    assert!(store.save_snapshot(&path).expect("save"));

    let mode = fs::metadata(&path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

/// A file that merely shares the snapshot's name plus `.tmp` is left alone.
#[test]
fn save_leaves_sibling_files_untouched() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cases.bin");
    let sibling = temp.path().join("cases.bin.tmp");
    fs::write(&path, b"").expect("touch");
    fs::write(&sibling, b"keep me").expect("sibling");

    let mut store = offline_store();
    store.add_record(PersonRecord::create("Ana", "", false).expect("create"));
    assert!(store.save_snapshot(&path).expect("save"));
    assert_eq!(fs::read(&sibling).expect("read"), b"keep me");
}
