//! Pipeline execution implementation.

use super::pool::{HashWorkerPool, PoolOutcome, DEFAULT_POLL_INTERVAL, DEFAULT_WORKERS};
use super::CancellationToken;
use crate::core::scanner::{DirectoryScanner, ScanConfig, WalkDirScanner};
use crate::core::store::{SharedStore, SortMode};
use crate::error::MarkDuplicatesError;
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Cancelled by the user; the store is empty
    Cancelled,
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    pub status: RunStatus,
    /// Files found in the directory
    pub total_files: usize,
    /// Raw size of every file found
    pub total_bytes: u64,
    /// Digests written by the workers
    pub files_hashed: usize,
    /// Records flagged after the digest sort
    pub duplicate_count: usize,
    /// Entries that could not be listed (non-fatal)
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn is_cancelled(&self) -> bool {
        self.status == RunStatus::Cancelled
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory to scan
    pub directory: PathBuf,
    /// Number of hashing workers
    pub workers: usize,
    /// How often the coordinator publishes progress and checks for cancellation
    pub poll_interval: Duration,
    /// Scanner configuration
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            workers: DEFAULT_WORKERS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            scan_config: ScanConfig::default(),
        }
    }
}

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory to scan
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    /// Set the number of hashing workers (at least one)
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers.max(1);
        self
    }

    /// Set the coordinator poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Include dot-files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline { config: self.config }
    }
}

/// Enumerate, hash and sort one directory into a record store
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events or cancellation
    pub fn run(&self, store: &SharedStore) -> Result<PipelineResult, MarkDuplicatesError> {
        self.run_with_events(store, &CancellationToken::new(), &null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// The store is reset first. A completed run leaves it sorted by digest
    /// with duplicates flagged; a cancelled run leaves it empty.
    pub fn run_with_events(
        &self,
        store: &SharedStore,
        cancel: &CancellationToken,
        events: &EventSender,
    ) -> Result<PipelineResult, MarkDuplicatesError> {
        let start_time = Instant::now();
        let directory = &self.config.directory;

        events.send(Event::Pipeline(PipelineEvent::Started));
        store.lock().clear();

        // Phase 1: Enumerating
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Enumerating,
        }));

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let mut scan_result = match scanner.scan_with_events(directory, events) {
            Ok(result) => result,
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };

        let errors: Vec<String> = scan_result.errors.iter().map(|e| e.to_string()).collect();
        let total_files = scan_result.total_files();
        let total_bytes = scan_result.total_bytes;
        scan_result.populate(&mut store.lock());

        info!(
            directory = %directory.display(),
            total_files,
            total_bytes,
            skipped = errors.len(),
            "Directory enumerated"
        );

        // Phase 2: Hashing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Hashing,
        }));

        let pool = HashWorkerPool::new(self.config.workers, self.config.poll_interval);
        let files_hashed = match pool.run(store, directory, cancel, events) {
            Ok(PoolOutcome::Completed { files_hashed }) => files_hashed,
            Ok(PoolOutcome::Cancelled) => {
                events.send(Event::Pipeline(PipelineEvent::Cancelled));
                return Ok(PipelineResult {
                    status: RunStatus::Cancelled,
                    total_files,
                    total_bytes,
                    files_hashed: 0,
                    duplicate_count: 0,
                    errors,
                    duration_ms: start_time.elapsed().as_millis() as u64,
                });
            }
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };

        // Phase 3: Sorting
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Sorting,
        }));

        let duplicate_count = {
            let mut store = store.lock();
            store.sort_and_check(SortMode::ByDigest);
            store.duplicate_count()
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(files_hashed, duplicate_count, duration_ms, "Scan complete");

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files,
                total_bytes,
                duplicate_count,
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            status: RunStatus::Completed,
            total_files,
            total_bytes,
            files_hashed,
            duplicate_count,
            errors,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use tempfile::TempDir;

    #[test]
    fn pipeline_builder_creates_pipeline() {
        let pipeline = Pipeline::builder()
            .directory("/data")
            .workers(0)
            .poll_interval(Duration::from_millis(10))
            .include_hidden(false)
            .build();

        assert_eq!(pipeline.config().directory, PathBuf::from("/data"));
        assert_eq!(pipeline.config().workers, 1);
        assert!(!pipeline.config().scan_config.include_hidden);
    }

    #[test]
    fn defaults_match_reference_behavior() {
        let config = PipelineConfig::default();
        assert_eq!(config.workers, 2);
        assert_eq!(config.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn pipeline_handles_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = SharedStore::default();

        let result = Pipeline::builder()
            .directory(temp_dir.path())
            .build()
            .run(&store)
            .unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.total_files, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn pipeline_flags_identical_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), b"same").unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), b"same").unwrap();
        std::fs::write(temp_dir.path().join("c.txt"), b"different").unwrap();
        let store = SharedStore::default();

        let result = Pipeline::builder()
            .directory(temp_dir.path())
            .build()
            .run(&store)
            .unwrap();

        assert_eq!(result.total_files, 3);
        assert_eq!(result.total_bytes, 17);
        assert_eq!(result.files_hashed, 3);
        assert_eq!(result.duplicate_count, 1);

        let store = store.lock();
        let duplicate = store.records().iter().find(|r| r.is_duplicate).unwrap();
        assert_eq!(duplicate.name, "b.txt");
    }

    #[test]
    fn rerun_replaces_previous_records() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("only.txt"), b"x").unwrap();
        let store = SharedStore::default();
        let pipeline = Pipeline::builder().directory(temp_dir.path()).build();

        pipeline.run(&store).unwrap();
        pipeline.run(&store).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.progress(), (1, 1));
    }

    #[test]
    fn cancelled_pipeline_reports_status_and_event() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a"), b"a").unwrap();
        let store = SharedStore::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (sender, receiver) = EventChannel::new();

        let result = Pipeline::builder()
            .directory(temp_dir.path())
            .build()
            .run_with_events(&store, &cancel, &sender)
            .unwrap();

        assert!(result.is_cancelled());
        assert!(store.is_empty());
        drop(sender);
        let saw_cancel = receiver
            .iter()
            .any(|e| matches!(e, Event::Pipeline(PipelineEvent::Cancelled)));
        assert!(saw_cancel);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let store = SharedStore::default();
        let result = Pipeline::builder()
            .directory("/nonexistent/path/12345")
            .build()
            .run(&store);

        assert!(matches!(result, Err(MarkDuplicatesError::Scan(_))));
    }
}
