//! A working session: the record store, how it is being viewed, and
//! whether its duplicates have already been renamed.

use crate::core::marker::{mark_duplicates, MarkReport};
use crate::core::pipeline::{CancellationToken, Pipeline, PipelineResult};
use crate::core::reporter::{render_page, Page, PageLayout};
use crate::core::store::{FileRecord, SharedStore, SortMode, ViewState};
use crate::error::{MarkDuplicatesError, MarkError, PersistError, StoreError};
use crate::events::{null_sender, EventSender};
use std::path::Path;
use tracing::info;

/// Store plus view state plus the "already marked" flag
#[derive(Debug, Default)]
pub struct Session {
    store: SharedStore,
    view: ViewState,
    marked: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Scan the pipeline's directory into this session.
    ///
    /// The view returns to digest order at the top of the list.
    pub fn scan(
        &mut self,
        pipeline: &Pipeline,
        cancel: &CancellationToken,
        events: &EventSender,
    ) -> Result<PipelineResult, MarkDuplicatesError> {
        self.view = ViewState {
            directory: pipeline.config().directory.clone(),
            ..ViewState::default()
        };
        self.marked = false;

        pipeline.run_with_events(&self.store, cancel, events)
    }

    /// Sort into another order and return to the top of the list
    pub fn resort(&mut self, mode: SortMode) -> Result<(), StoreError> {
        let mut store = self.store.lock();
        if store.is_empty() {
            return Err(StoreError::Empty);
        }
        store.sort_and_check(mode);
        self.view.sort_mode = mode;
        self.view.start_index = 0;
        Ok(())
    }

    /// Manually override one record's duplicate flag
    pub fn set_duplicate(&mut self, index: usize, duplicate: bool) -> Result<(), StoreError> {
        self.store.lock().set_duplicate(index, duplicate)
    }

    pub fn set_start(&mut self, index: usize) {
        self.view.start_index = index;
    }

    pub fn select(&mut self, index: usize) {
        self.view.selected_index = index;
    }

    pub fn record(&self, index: usize) -> Result<FileRecord, StoreError> {
        self.store.lock().get(index).cloned()
    }

    /// Rename every flagged duplicate; refused once per scan.
    ///
    /// A run that renamed anything counts as marked, even if it then failed,
    /// since the store no longer matches the directory.
    pub fn mark(&mut self, events: &EventSender) -> Result<MarkReport, MarkError> {
        if self.marked {
            return Err(MarkError::AlreadyMarked);
        }

        let result = {
            let store = self.store.lock();
            mark_duplicates(&store, &self.view.directory, events)
        };
        if matches!(result, Ok(_) | Err(MarkError::Incomplete { .. })) {
            self.marked = true;
        }
        result
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        self.store.lock().save(&self.view, path)
    }

    /// Replace the session with a saved one.
    ///
    /// A failed load leaves an empty store.
    pub fn load(&mut self, path: &Path) -> Result<(), PersistError> {
        self.marked = false;
        match self.store.lock().load(path) {
            Ok(view) => {
                self.view = view;
                info!(directory = %self.view.directory.display(), "Session restored");
                Ok(())
            }
            Err(e) => {
                self.view = ViewState::default();
                Err(e)
            }
        }
    }

    /// Open a session file
    pub fn open(path: &Path) -> Result<Self, PersistError> {
        let mut session = Self::new();
        session.load(path)?;
        Ok(session)
    }

    /// Render the current page and keep the clamped selection
    pub fn page(&mut self, layout: PageLayout) -> Page {
        let page = render_page(&self.store.lock(), &self.view, layout);
        self.view.selected_index = page.selected_index;
        page
    }

    /// Scan with no listener and no way to cancel
    pub fn scan_quietly(&mut self, pipeline: &Pipeline) -> Result<PipelineResult, MarkDuplicatesError> {
        self.scan(pipeline, &CancellationToken::new(), &null_sender())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scanned_session(temp_dir: &TempDir) -> Session {
        std::fs::write(temp_dir.path().join("one.txt"), b"same").unwrap();
        std::fs::write(temp_dir.path().join("two.txt"), b"same").unwrap();
        std::fs::write(temp_dir.path().join("three.txt"), b"other").unwrap();

        let mut session = Session::new();
        let pipeline = Pipeline::builder().directory(temp_dir.path()).build();
        session.scan_quietly(&pipeline).unwrap();
        session
    }

    #[test]
    fn scan_resets_the_view() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = scanned_session(&temp_dir);
        session.resort(SortMode::BySize).unwrap();
        session.set_start(2);

        let pipeline = Pipeline::builder().directory(temp_dir.path()).build();
        session.scan_quietly(&pipeline).unwrap();

        assert_eq!(session.view().sort_mode, SortMode::ByDigest);
        assert_eq!(session.view().start_index, 0);
        assert_eq!(session.view().directory, temp_dir.path());
    }

    #[test]
    fn resort_requires_records() {
        let mut session = Session::new();
        assert_eq!(session.resort(SortMode::ByName), Err(StoreError::Empty));
    }

    #[test]
    fn resort_returns_to_the_top() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = scanned_session(&temp_dir);
        session.set_start(1);

        session.resort(SortMode::ByName).unwrap();

        assert_eq!(session.view().start_index, 0);
        assert_eq!(session.record(0).unwrap().name, "one.txt");
    }

    #[test]
    fn second_mark_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = scanned_session(&temp_dir);

        let report = session.mark(&null_sender()).unwrap();
        assert_eq!(report.renamed.len(), 1);
        assert!(temp_dir.path().join("two.DELETE.txt").exists());

        assert!(matches!(session.mark(&null_sender()), Err(MarkError::AlreadyMarked)));
    }

    #[test]
    fn partial_mark_still_blocks_a_retry() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), b"same").unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), b"same").unwrap();
        std::fs::write(temp_dir.path().join("c.txt"), b"same").unwrap();
        let mut session = Session::new();
        let pipeline = Pipeline::builder().directory(temp_dir.path()).build();
        session.scan_quietly(&pipeline).unwrap();
        std::fs::write(temp_dir.path().join("c.DELETE.txt"), b"taken").unwrap();

        let first = session.mark(&null_sender());

        assert!(matches!(first, Err(MarkError::Incomplete { renamed: 1, .. })));
        assert!(session.is_marked());
        assert!(matches!(session.mark(&null_sender()), Err(MarkError::AlreadyMarked)));
    }

    #[test]
    fn failed_mark_with_no_renames_can_be_retried() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), b"same").unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), b"same").unwrap();
        let mut session = Session::new();
        let pipeline = Pipeline::builder().directory(temp_dir.path()).build();
        session.scan_quietly(&pipeline).unwrap();
        std::fs::write(temp_dir.path().join("b.DELETE.txt"), b"taken").unwrap();

        assert!(matches!(session.mark(&null_sender()), Err(MarkError::TargetExists { .. })));
        assert!(!session.is_marked());

        std::fs::remove_file(temp_dir.path().join("b.DELETE.txt")).unwrap();
        assert_eq!(session.mark(&null_sender()).unwrap().renamed.len(), 1);
    }

    #[test]
    fn empty_session_cannot_mark_or_save() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::new();

        assert!(matches!(session.mark(&null_sender()), Err(MarkError::NothingScanned)));
        assert!(!session.is_marked());
        assert!(matches!(
            session.save(&temp_dir.path().join("s.mdc")),
            Err(PersistError::NothingToSave)
        ));
    }

    #[test]
    fn save_and_open_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let session_dir = TempDir::new().unwrap();
        let mut session = scanned_session(&temp_dir);
        session.set_duplicate(0, true).unwrap();
        session.select(2);
        let path = session_dir.path().join("MarkDuplicates.mdc");

        session.save(&path).unwrap();
        let restored = Session::open(&path).unwrap();

        assert_eq!(restored.view(), session.view());
        assert_eq!(restored.store().lock().records(), session.store().lock().records());
        assert!(!restored.is_marked());
    }

    #[test]
    fn page_keeps_the_clamped_selection() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = scanned_session(&temp_dir);
        session.set_start(1);
        session.select(0);

        let page = session.page(PageLayout::terminal(40));

        assert_eq!(page.selected_index, 1);
        assert_eq!(session.view().selected_index, 1);
    }
}
