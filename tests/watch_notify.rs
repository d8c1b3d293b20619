// tests/watch_notify.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use layerbuild::fs::RealFileSystem;
use layerbuild::watch::{TriggerReason, WatchCoordinator};
use tempfile::TempDir;

#[tokio::test]
async fn editing_a_watched_file_triggers_its_task() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let styles = dir.path().join("dev/content-layer");
    fs::create_dir_all(&styles).unwrap();
    fs::write(styles.join("main.scss"), "a { color: red; }").unwrap();

    let (mut coordinator, mut rx) =
        WatchCoordinator::new(dir.path(), true, Arc::new(RealFileSystem));
    let mut handle = coordinator
        .watch("dev/content-layer/main.scss", "compileCss")
        .unwrap();
    assert!(handle.is_active());

    // Give the backend a moment to register before editing.
    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(styles.join("main.scss"), "a { color: blue; }").unwrap();

    let trigger = with_timeout(rx.recv()).await.unwrap();
    assert_eq!(trigger.task, "compileCss");
    assert_eq!(trigger.path, PathBuf::from("dev/content-layer/main.scss"));
    assert_eq!(trigger.reason, TriggerReason::Changed);
    assert_eq!(trigger.binding, handle.id());

    handle.stop();
    assert!(!handle.is_active());
}

#[tokio::test]
async fn sibling_files_do_not_trigger() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("dev/backend-layer");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("main.js"), "let a;").unwrap();

    let (mut coordinator, mut rx) =
        WatchCoordinator::new(dir.path(), false, Arc::new(RealFileSystem));
    let _handle = coordinator.watch("dev/backend-layer/main.js", "lintJs").unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(folder.join("notes.txt"), "unrelated").unwrap();

    let waited = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
    assert!(waited.is_err(), "unexpected trigger: {waited:?}");
}

#[test]
fn watching_a_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let (mut coordinator, _rx) =
        WatchCoordinator::new(dir.path(), false, Arc::new(RealFileSystem));
    assert!(coordinator.watch("nope/main.js", "lintJs").is_err());
}
