//! Integration tests for whole sessions.
//!
//! These tests drive the library the way the command line does:
//! - Scan a directory, save the session, reopen it
//! - Manual overrides and re-sorting survive a save
//! - Marking renames flagged files and never overwrites

use assert_fs::prelude::*;
use mark_duplicates::core::pipeline::Pipeline;
use mark_duplicates::core::store::SortMode;
use mark_duplicates::core::Session;
use mark_duplicates::error::{MarkDuplicatesError, MarkError, PersistError, ScanError};
use mark_duplicates::events::null_sender;
use predicates::prelude::*;

const ABC_DIGEST: &str = "A9 99 3E 36 47 06 81 6A BA 3E 25 71 78 50 C2 6C 9C D0 D8 9D";

fn scan(dir: &assert_fs::TempDir) -> Session {
    let mut session = Session::new();
    let pipeline = Pipeline::builder().directory(dir.path()).workers(3).build();
    session.scan_quietly(&pipeline).unwrap();
    session
}

#[test]
fn scan_save_open_and_mark() {
    let photos = assert_fs::TempDir::new().unwrap();
    photos.child("beach.jpg").write_str("same bytes").unwrap();
    photos.child("beach copy.jpg").write_str("same bytes").unwrap();
    photos.child("notes.txt").write_str("different").unwrap();
    let sessions = assert_fs::TempDir::new().unwrap();
    let session_file = sessions.child("MarkDuplicates.mdc");

    let session = scan(&photos);
    assert_eq!(session.store().lock().duplicate_count(), 1);
    session.save(session_file.path()).unwrap();
    session_file.assert(predicate::path::is_file());

    let mut reopened = Session::open(session_file.path()).unwrap();
    let report = reopened.mark(&null_sender()).unwrap();

    // "beach copy.jpg" sorts before "beach.jpg", so it is the one kept
    assert_eq!(report.renamed.len(), 1);
    assert_eq!(report.renamed[0].to, "beach.DELETE.jpg");
    photos.child("beach.DELETE.jpg").assert(predicate::path::exists());
    photos.child("beach.jpg").assert(predicate::path::missing());
    photos.child("beach copy.jpg").assert(predicate::path::exists());
    photos.child("notes.txt").assert(predicate::path::exists());
}

#[test]
fn session_file_layout() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("abc.dat").write_str("abc").unwrap();
    let sessions = assert_fs::TempDir::new().unwrap();
    let session_file = sessions.child("scan.mdc");

    let session = scan(&dir);
    session.save(session_file.path()).unwrap();

    let header = format!("0|0|0|{}\r\n", dir.path().display());
    session_file.assert(predicate::str::starts_with(header));
    session_file.assert(predicate::str::contains(ABC_DIGEST));
    session_file.assert(predicate::str::ends_with("|        3|O|abc.dat\r\n"));
}

#[test]
fn overrides_and_sort_order_survive_a_save() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("b.txt").write_str("bb").unwrap();
    dir.child("a.txt").write_str("a").unwrap();
    dir.child("c.txt").write_str("ccc").unwrap();
    let sessions = assert_fs::TempDir::new().unwrap();
    let session_file = sessions.child("scan.mdc");

    let mut session = scan(&dir);
    session.resort(SortMode::BySize).unwrap();
    session.set_duplicate(2, true).unwrap();
    session.save(session_file.path()).unwrap();

    let reopened = Session::open(session_file.path()).unwrap();
    assert_eq!(reopened.view().sort_mode, SortMode::BySize);

    let names: Vec<String> = reopened
        .store()
        .lock()
        .records()
        .iter()
        .map(|r| r.name.clone())
        .collect();
    assert_eq!(names, ["a.txt", "b.txt", "c.txt"]);
    assert!(reopened.record(2).unwrap().is_duplicate);
}

#[test]
fn marking_never_overwrites() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("a.txt").write_str("same").unwrap();
    dir.child("b.txt").write_str("same").unwrap();
    dir.child("b.DELETE.txt").write_str("someone else's file").unwrap();

    let mut session = scan(&dir);
    let result = session.mark(&null_sender());

    assert!(matches!(result, Err(MarkError::TargetExists { .. })));
    dir.child("b.txt").assert(predicate::path::exists());
    dir.child("b.DELETE.txt").assert("someone else's file");
    assert!(!session.is_marked());
}

#[test]
fn hidden_files_can_be_left_out() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".DS_Store").write_str("same").unwrap();
    dir.child("visible.txt").write_str("same").unwrap();

    let pipeline = Pipeline::builder()
        .directory(dir.path())
        .include_hidden(false)
        .build();
    let mut session = Session::new();
    let result = session.scan_quietly(&pipeline).unwrap();

    assert_eq!(result.total_files, 1);
    assert_eq!(result.duplicate_count, 0);
}

#[test]
fn empty_directory_has_nothing_to_save() {
    let dir = assert_fs::TempDir::new().unwrap();
    let sessions = assert_fs::TempDir::new().unwrap();
    let session_file = sessions.child("scan.mdc");

    let session = scan(&dir);

    assert!(matches!(
        session.save(session_file.path()),
        Err(PersistError::NothingToSave)
    ));
    session_file.assert(predicate::path::missing());
}

#[test]
fn missing_directory_is_reported() {
    let dir = assert_fs::TempDir::new().unwrap();
    let pipeline = Pipeline::builder()
        .directory(dir.path().join("not-there"))
        .build();

    let result = Session::new().scan_quietly(&pipeline);

    assert!(matches!(
        result,
        Err(MarkDuplicatesError::Scan(ScanError::DirectoryNotFound { .. }))
    ));
}

#[test]
fn corrupt_session_leaves_an_empty_store() {
    let sessions = assert_fs::TempDir::new().unwrap();
    let session_file = sessions.child("broken.mdc");
    session_file
        .write_str("0|0|0|/data\r\nDIGEST|01/01/2024|10:00|        1|maybe|a.txt\r\n")
        .unwrap();

    let mut session = Session::new();
    let result = session.load(session_file.path());

    assert!(matches!(result, Err(PersistError::Malformed { line: 2, .. })));
    assert!(session.store().is_empty());
}
