//! # Scanner Module
//!
//! Lists the files of a single directory and turns each one into an
//! unhashed [`FileRecord`].
//!
//! Only one level is listed. Subdirectories are skipped, not descended
//! into. Each record carries the local last-write date (`mm/dd/yyyy`), time
//! (`hh:mm`) and a right-justified size string.
//!
//! ## Example
//! ```rust,ignore
//! use mark_duplicates::core::scanner::{DirectoryScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/data/downloads"))?;
//! println!("{} files, {} bytes", result.files.len(), result.total_bytes);
//! ```

mod walker;

pub use walker::{format_timestamp, ScanConfig, WalkDirScanner, SIZE_WIDTH};

use crate::core::store::{FileRecord, RecordStore};
use crate::error::ScanError;
use crate::events::EventSender;
use std::path::Path;

/// Result of listing a directory
#[derive(Debug, Default)]
pub struct ScanResult {
    /// One unhashed record per file, in file-name order
    pub files: Vec<FileRecord>,
    /// Raw byte total of every listed file
    pub total_bytes: u64,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    /// Append every listed file to the store
    pub fn populate(&mut self, store: &mut RecordStore) {
        for record in self.files.drain(..) {
            store.push(record);
        }
    }
}

/// Trait for directory scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait DirectoryScanner: Send + Sync {
    /// List a directory
    fn scan(&self, directory: &Path) -> Result<ScanResult, ScanError>;

    /// List with progress reporting via events
    fn scan_with_events(&self, directory: &Path, events: &EventSender) -> Result<ScanResult, ScanError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_moves_files_into_the_store() {
        let mut result = ScanResult {
            files: vec![
                FileRecord::new("", "01/01/2024", "00:00", "        1", "a"),
                FileRecord::new("", "01/01/2024", "00:00", "        2", "b"),
            ],
            total_bytes: 3,
            errors: Vec::new(),
        };
        let mut store = RecordStore::new();

        result.populate(&mut store);

        assert_eq!(store.len(), 2);
        assert_eq!(store.file_name(1).unwrap(), "b");
        assert_eq!(result.total_files(), 0);
        assert_eq!(result.total_bytes, 3);
    }
}
