//! Integration tests for the pipeline module.
//!
//! These tests verify end-to-end pipeline behavior including:
//! - Empty directories
//! - Many files hashed by several workers
//! - Subdirectories left alone
//! - Event reporting

use mark_duplicates::core::digest::digest_file;
use mark_duplicates::core::pipeline::{CancellationToken, Pipeline, RunStatus};
use mark_duplicates::core::store::SharedStore;
use mark_duplicates::events::{Event, EventChannel, HashEvent, PipelineEvent, ScanEvent};
use std::fs;
use tempfile::TempDir;

#[test]
fn pipeline_handles_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let store = SharedStore::default();

    let pipeline = Pipeline::builder().directory(temp_dir.path()).build();
    let result = pipeline.run(&store).unwrap();

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.total_files, 0);
    assert_eq!(result.files_hashed, 0);
    assert!(store.is_empty());
}

#[test]
fn every_file_is_hashed_exactly_once() {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..60 {
        let content = format!("content {}", i % 7);
        fs::write(temp_dir.path().join(format!("file{i:02}.bin")), content).unwrap();
    }
    let store = SharedStore::default();

    let pipeline = Pipeline::builder()
        .directory(temp_dir.path())
        .workers(4)
        .build();
    let result = pipeline.run(&store).unwrap();

    assert_eq!(result.total_files, 60);
    assert_eq!(result.files_hashed, 60);
    assert_eq!(result.duplicate_count, 60 - 7);

    let store = store.lock();
    assert_eq!(store.records_processed(), 60);
    assert_eq!(store.next_unprocessed(), 60);
    for record in store.records() {
        let expected = digest_file(&temp_dir.path().join(&record.name)).unwrap();
        assert_eq!(record.digest, expected.to_hex(), "{}", record.name);
    }
}

#[test]
fn duplicates_are_adjacent_after_a_scan() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("z.txt"), b"one").unwrap();
    fs::write(temp_dir.path().join("m.txt"), b"two").unwrap();
    fs::write(temp_dir.path().join("a.txt"), b"one").unwrap();
    fs::write(temp_dir.path().join("Q.txt"), b"one").unwrap();
    let store = SharedStore::default();

    Pipeline::builder()
        .directory(temp_dir.path())
        .build()
        .run(&store)
        .unwrap();

    let store = store.lock();
    let records = store.records();
    assert!(!records[0].is_duplicate);
    for pair in records.windows(2) {
        assert_eq!(pair[1].is_duplicate, pair[1].digest == pair[0].digest);
    }

    let group: Vec<&str> = records
        .iter()
        .filter(|r| r.digest == records.iter().find(|r| r.name == "a.txt").unwrap().digest)
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(group, ["a.txt", "Q.txt", "z.txt"]);
}

#[test]
fn subdirectories_are_not_descended() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("top.txt"), b"same").unwrap();
    fs::create_dir(temp_dir.path().join("nested")).unwrap();
    fs::write(temp_dir.path().join("nested").join("inner.txt"), b"same").unwrap();
    let store = SharedStore::default();

    let result = Pipeline::builder()
        .directory(temp_dir.path())
        .build()
        .run(&store)
        .unwrap();

    assert_eq!(result.total_files, 1);
    assert_eq!(result.duplicate_count, 0);
    assert_eq!(store.lock().records()[0].name, "top.txt");
}

#[test]
fn pipeline_reports_progress_events() {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..5 {
        fs::write(temp_dir.path().join(format!("{i}.dat")), vec![i as u8; 100]).unwrap();
    }
    let store = SharedStore::default();
    let (sender, receiver) = EventChannel::new();

    let pipeline = Pipeline::builder().directory(temp_dir.path()).build();
    pipeline
        .run_with_events(&store, &CancellationToken::new(), &sender)
        .unwrap();
    drop(sender);

    let events: Vec<Event> = receiver.iter().collect();

    assert!(events.iter().any(|e| matches!(
        e,
        Event::Scan(ScanEvent::Completed { total_files: 5, total_bytes: 500 })
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::Hash(HashEvent::Completed { files_hashed: 5 }))));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, Event::Hash(HashEvent::FileHashed { .. })))
            .count(),
        5
    );
    assert!(matches!(
        events.last(),
        Some(Event::Pipeline(PipelineEvent::Completed { .. }))
    ));
}

#[cfg(unix)]
#[test]
fn undecodable_name_does_not_abort_the_scan() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), b"same").unwrap();
    fs::write(temp_dir.path().join("b.txt"), b"same").unwrap();
    if fs::write(temp_dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")), b"same").is_err() {
        return;
    }
    let store = SharedStore::default();

    let result = Pipeline::builder()
        .directory(temp_dir.path())
        .build()
        .run(&store)
        .unwrap();

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.total_files, 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.duplicate_count, 1);
    assert_eq!(store.len(), 2);
}
