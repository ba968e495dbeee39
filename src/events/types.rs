//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while scanning, hashing and marking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory enumeration events
    Scan(ScanEvent),
    /// Hashing phase events
    Hash(HashEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
    /// Marking (renaming) events
    Mark(MarkEvent),
}

/// Events during directory enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Enumeration has started
    Started { directory: PathBuf },
    /// A file was found and added to the record store
    FileFound { name: String, size: u64 },
    /// An entry could not be read but enumeration continues
    Error { path: PathBuf, message: String },
    /// Enumeration completed
    Completed { total_files: usize, total_bytes: u64 },
}

/// Events during the hashing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Hashing has started
    Started { total_files: usize, workers: usize },
    /// Periodic progress from the coordinator
    Progress(HashProgress),
    /// A worker saved a digest
    FileHashed { index: usize, name: String },
    /// Hashing completed
    Completed { files_hashed: usize },
}

/// Progress information during hashing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of digests saved so far
    pub files_processed: usize,
    /// Total number of records to hash
    pub total_files: usize,
    /// Rounded percentage complete
    pub percent: u32,
    /// Megabytes hashed so far
    pub megabytes_processed: u64,
}

impl HashProgress {
    /// Build a progress snapshot from raw counters
    pub fn new(files_processed: usize, total_files: usize, bytes_processed: u64) -> Self {
        let percent = if total_files == 0 {
            100
        } else {
            (files_processed as f64 * 100.0 / total_files as f64).round() as u32
        };

        Self {
            files_processed,
            total_files,
            percent,
            megabytes_processed: bytes_processed / 1024 / 1024,
        }
    }
}

impl std::fmt::Display for HashProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Files processed: {}     {}% of {}     MBytes processed: {}",
            self.files_processed, self.percent, self.total_files, self.megabytes_processed
        )
    }
}

/// Events during marking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MarkEvent {
    /// A duplicate was renamed
    Renamed { from: String, to: String },
    /// Marking completed
    Completed { renamed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled and the record store discarded
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Enumerating,
    Hashing,
    Sorting,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Files found in the directory
    pub total_files: usize,
    /// Raw size of every file found
    pub total_bytes: u64,
    /// Records flagged as duplicates after the digest sort
    pub duplicate_count: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Enumerating => write!(f, "Enumerating"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Sorting => write!(f, "Sorting"),
        }
    }
}
