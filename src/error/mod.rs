//! # Error Module
//!
//! Error types for the duplicate file marker.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, the operation that failed
//! - **Keep kinds distinguishable** - an unreadable file and a digest engine
//!   misuse are different failures and callers can tell them apart
//! - **Cancellation is not an error** - it is reported as an outcome

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum MarkDuplicatesError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Digest error: {0}")]
    Digest(#[from] DigestError),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Hashing error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Session file error: {0}")]
    Persist(#[from] PersistError),

    #[error("Marking error: {0}")]
    Mark(#[from] MarkError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while enumerating a directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File name is not valid UTF-8: {path}")]
    InvalidName { path: PathBuf },

    #[error("Failed to read metadata for {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the content digest engine
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input data too long: more than {limit} bytes")]
    InputTooLong { limit: u64 },

    #[error("Digest input or result requested after the result was produced")]
    StateError,

    #[error("Bad check file {path}: {reason}")]
    CheckFile { path: PathBuf, reason: String },
}

impl DigestError {
    /// True for failures that indicate a programming defect rather than
    /// a problem with the file being hashed.
    pub fn is_internal(&self) -> bool {
        matches!(self, DigestError::InputTooLong { .. } | DigestError::StateError)
    }
}

/// Errors from record store accessors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("No record at index {index} (store holds {count})")]
    NotFound { index: usize, count: usize },

    #[error("No files to process. Scan first.")]
    Empty,
}

/// Errors from the concurrent hashing pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to start the hashing workers: {0}")]
    PoolStartup(String),

    #[error("Hashing {name} failed: {source}")]
    Worker {
        name: String,
        #[source]
        source: DigestError,
    },

    #[error("A hashing worker exited without reporting")]
    WorkerLost,
}

/// Errors while saving or loading a session file
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("{operation} failed for {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed session file at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Session file has no header line")]
    MissingHeader,

    #[error("No files to save. Scan first, then save.")]
    NothingToSave,
}

/// Errors from the duplicate marking operation
#[derive(Error, Debug)]
pub enum MarkError {
    #[error("Already marked. Rescan first.")]
    AlreadyMarked,

    #[error("No files to mark. Scan first, then mark.")]
    NothingScanned,

    #[error("Cannot rename {from}: {to} already exists")]
    TargetExists { from: PathBuf, to: PathBuf },

    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Marking stopped after {renamed} rename(s): {source}. Rescan first.")]
    Incomplete {
        renamed: usize,
        #[source]
        source: Box<MarkError>,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, MarkDuplicatesError>;
