//! # Record Store Module
//!
//! Holds one record per file in the scanned directory and keeps them in the
//! last applied sort order.
//!
//! ## Lifecycle
//! 1. **Populate** - the enumerator appends unhashed records
//! 2. **Hash** - workers claim records through the cursor and save digests
//! 3. **Sort** - `sort_and_check(SortMode::ByDigest)` groups identical
//!    digests and flags every record that matches its predecessor
//! 4. **Edit / persist** - single flags are overridden, the store is saved
//!    or loaded as a session file
//!
//! ## Example
//! ```rust,ignore
//! use mark_duplicates::core::store::{RecordStore, SortMode};
//!
//! let mut store = RecordStore::new();
//! store.add_record("", "01/02/2024", "09:15", "     1024", "a.txt");
//! store.sort_and_check(SortMode::ByDigest);
//! ```

mod ordering;
pub mod persist;

pub use ordering::{compare_dates, compare_names, compare_records, compare_sizes, compare_times};
pub use persist::ViewState;

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Records reserved per growth step
pub const DEFAULT_INCREMENT: usize = 1000;

/// One tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Rendered content digest, empty until hashed
    pub digest: String,
    /// Last write date, `mm/dd/yyyy`
    pub date: String,
    /// Last write time, `hh:mm`
    pub time: String,
    /// Size as a right-justified decimal string
    pub size: String,
    /// File name within the scanned directory
    pub name: String,
    pub is_duplicate: bool,
}

impl FileRecord {
    pub fn new(
        digest: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        size: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            digest: digest.into(),
            date: date.into(),
            time: time.into(),
            size: size.into(),
            name: name.into(),
            is_duplicate: false,
        }
    }

    /// Numeric value of the size field, read the way `atoi` reads it
    pub fn size_bytes(&self) -> u64 {
        parse_leading_number(&self.size)
    }
}

/// Skip leading whitespace, then accumulate decimal digits until the first non-digit
fn parse_leading_number(text: &str) -> u64 {
    text.trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        })
}

/// The four total orders a store can be sorted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Digest, then name; also flags duplicates
    #[default]
    ByDigest,
    /// Name alone
    ByName,
    /// Date, then time, then name
    ByDateTime,
    /// Size, then name
    BySize,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::ByDigest,
        SortMode::ByName,
        SortMode::ByDateTime,
        SortMode::BySize,
    ];

    /// Numeric mode as stored in session files
    pub fn index(self) -> u8 {
        match self {
            SortMode::ByDigest => 0,
            SortMode::ByName => 1,
            SortMode::ByDateTime => 2,
            SortMode::BySize => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Human-readable label used by the status line
    pub fn label(self) -> &'static str {
        match self {
            SortMode::ByDigest => "SHA-1 Digest, then by File Name",
            SortMode::ByName => "File Name, alone",
            SortMode::ByDateTime => "File Date/Time, then by File Name",
            SortMode::BySize => "File Size, then by File Name",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Growable, indexed collection of file records with a work cursor
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<FileRecord>,
    increment: usize,
    next_unprocessed: usize,
    records_processed: usize,
    bytes_processed: u64,
}

impl RecordStore {
    /// Create an empty store with the default growth increment
    pub fn new() -> Self {
        Self::with_increment(DEFAULT_INCREMENT)
    }

    /// Create an empty store that grows `increment` records at a time
    pub fn with_increment(increment: usize) -> Self {
        let increment = increment.max(1);
        Self {
            records: Vec::with_capacity(increment),
            increment,
            next_unprocessed: 0,
            records_processed: 0,
            bytes_processed: 0,
        }
    }

    /// Append a record; never rejects
    pub fn add_record(
        &mut self,
        digest: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        size: impl Into<String>,
        name: impl Into<String>,
    ) -> usize {
        self.push(FileRecord::new(digest, date, time, size, name))
    }

    /// Append a prepared record, returning its index
    pub fn push(&mut self, record: FileRecord) -> usize {
        if self.records.len() == self.records.capacity() {
            self.records.reserve_exact(self.increment);
        }
        self.records.push(record);
        self.records.len() - 1
    }

    /// Sort into `mode` order; in digest order, also rewrite every duplicate flag.
    ///
    /// After a digest sort, a record is a duplicate exactly when its digest
    /// equals the digest of the record before it.
    pub fn sort_and_check(&mut self, mode: SortMode) {
        self.records
            .sort_by(|a, b| ordering::compare_records(mode, a, b));

        if mode == SortMode::ByDigest {
            if let Some(first) = self.records.first_mut() {
                first.is_duplicate = false;
            }
            for i in 1..self.records.len() {
                let duplicate = self.records[i].digest == self.records[i - 1].digest;
                self.records[i].is_duplicate = duplicate;
            }
        }
    }

    pub fn get(&self, index: usize) -> Result<&FileRecord, StoreError> {
        self.records.get(index).ok_or(StoreError::NotFound {
            index,
            count: self.records.len(),
        })
    }

    pub fn set_duplicate(&mut self, index: usize, duplicate: bool) -> Result<(), StoreError> {
        let count = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(StoreError::NotFound { index, count })?;
        record.is_duplicate = duplicate;
        Ok(())
    }

    /// Name of the record at `index`
    pub fn file_name(&self, index: usize) -> Result<&str, StoreError> {
        self.get(index).map(|record| record.name.as_str())
    }

    /// Advance the work cursor, returning the claimed index and name
    pub fn claim_next(&mut self) -> Option<(usize, String)> {
        let index = self.next_unprocessed;
        let record = self.records.get(index)?;
        self.next_unprocessed += 1;
        Some((index, record.name.clone()))
    }

    /// Store a computed digest and update the processed counters.
    ///
    /// Saving twice for the same index counts its bytes twice.
    pub fn save_digest(&mut self, index: usize, digest: impl Into<String>) -> Result<(), StoreError> {
        let count = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(StoreError::NotFound { index, count })?;
        record.digest = digest.into();
        self.records_processed += 1;
        self.bytes_processed += record.size_bytes();
        Ok(())
    }

    /// Discard every record and reset counters and cursor.
    ///
    /// An increment of zero releases the storage as well.
    pub fn reset(&mut self, increment: usize) {
        if increment == 0 {
            self.records = Vec::new();
        } else {
            self.increment = increment;
            self.records.clear();
            self.records.shrink_to(increment);
        }
        self.next_unprocessed = 0;
        self.records_processed = 0;
        self.bytes_processed = 0;
    }

    /// Reset, keeping the current growth increment
    pub fn clear(&mut self) {
        self.reset(self.increment);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn records_processed(&self) -> usize {
        self.records_processed
    }

    pub fn bytes_processed(&self) -> u64 {
        self.bytes_processed
    }

    /// Position of the work cursor
    pub fn next_unprocessed(&self) -> usize {
        self.next_unprocessed
    }

    pub fn increment(&self) -> usize {
        self.increment
    }

    pub fn duplicate_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_duplicate).count()
    }

    /// Sum of every record's size field
    pub fn total_size_bytes(&self) -> u64 {
        self.records.iter().map(FileRecord::size_bytes).sum()
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a record store.
///
/// The lock is held only for the duration of each call, so a worker never
/// holds it while reading or hashing a file.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<RecordStore>>,
}

impl SharedStore {
    pub fn new(store: RecordStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, RecordStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn claim_next(&self) -> Option<(usize, String)> {
        self.lock().claim_next()
    }

    pub fn save_digest(&self, index: usize, digest: impl Into<String>) -> Result<(), StoreError> {
        self.lock().save_digest(index, digest)
    }

    /// Processed record count and byte total, read together
    pub fn progress(&self) -> (usize, u64) {
        let store = self.lock();
        (store.records_processed(), store.bytes_processed())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
