//! Scripted sessions through the interactive shell.

use casebook_rs::shell::Shell;
use casebook_rs_test_utils::{InMemoryBackend, offline_store, store_with};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::tempdir;

/// Run a scripted session and return the final store and captured output.
async fn run_script(
    script: &str,
    store: casebook_rs_registry::RecordStore,
    snapshot: &std::path::Path,
) -> (casebook_rs_registry::RecordStore, String) {
    let mut output = Vec::new();
    let mut shell = Shell::new(Cursor::new(script.to_string()), &mut output, store, snapshot);
    shell.run().await.expect("run");
    let store = shell.finish().await;
    (store, String::from_utf8(output).expect("utf8"))
}

#[tokio::test]
async fn register_save_and_reload() {
    let temp = tempdir().expect("tempdir");
    let snapshot = temp.path().join("cases.bin");
    fs::write(&snapshot, b"").expect("touch");

    let script = "1\nAna\n\n7\nx\n1\n1\nBruno\nasthma\n0\n4\n0\n";
    let (store, output) = run_script(script, offline_store(), &snapshot).await;
    assert_eq!(store.len(), 2);
    assert!(store.find_by_name("Ana").expect("ana").is_infected());
    assert!(output.contains("Name: Ana\ntrue\n"));
    assert!(output.contains("saved"));

    let (reloaded, output) = run_script("5\n2\n3\n", offline_store(), &snapshot).await;
    assert!(output.contains("loaded"));
    assert_eq!(reloaded.records(), store.records());
    let infected_section = output.rsplit("> ").nth(1).expect("infected listing");
    assert!(infected_section.contains("Ana"));
    assert!(!infected_section.contains("Bruno"));
}

#[tokio::test]
async fn duplicate_registration_is_reported() {
    let temp = tempdir().expect("tempdir");
    let snapshot = temp.path().join("cases.bin");
    let script = "1\nAna\n\n0\n1\nAna\nasthma\n1\n2\n";
    let (store, output) = run_script(script, offline_store(), &snapshot).await;
    assert_eq!(store.len(), 1);
    assert!(output.contains("duplicate: Name: Ana"));
}

#[tokio::test]
async fn missing_snapshot_reports_not_saved() {
    let temp = tempdir().expect("tempdir");
    let snapshot = temp.path().join("absent.bin");
    let (_store, output) = run_script("4\n5\n", offline_store(), &snapshot).await;
    assert!(output.contains("not saved"));
    assert!(output.contains("not loaded"));
    assert!(!snapshot.exists());
}

#[tokio::test]
async fn registration_is_pushed_and_fetchable() {
    let temp = tempdir().expect("tempdir");
    let snapshot = temp.path().join("cases.bin");
    let backend = Arc::new(InMemoryBackend::new());

    let (store, _output) =
        run_script("1\nCarla\n\n0\n", store_with(backend.clone(), None), &snapshot).await;
    let id = store.records()[0].id();
    assert_eq!(backend.put_keys(), vec![store.remote_key(id)]);

    let script = format!("6\n{id}\n6\nabc\n6\n{}\n", id + 1_000_000);
    let (_store, output) =
        run_script(&script, store_with(backend.clone(), None), &snapshot).await;
    assert!(output.contains(&format!("{id}\tCarla\t-\tinfected=false")));
    assert!(output.contains("invalid id: abc"));
    assert!(output.contains("not found"));
}

#[tokio::test]
async fn unknown_option_keeps_running() {
    let temp = tempdir().expect("tempdir");
    let snapshot = temp.path().join("cases.bin");
    let (_store, output) = run_script("9\n2\n", offline_store(), &snapshot).await;
    assert!(output.contains("unknown option: 9"));
    assert!(output.contains("(none)"));
}
