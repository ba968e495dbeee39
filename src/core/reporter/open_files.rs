//! Hit-testing index for one rendered page.

use serde::Serialize;

/// Default entries reserved per growth step
pub const OPEN_FILES_INCREMENT: usize = 25;

/// A rendered row's vertical extent and the record it shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenFileEntry {
    pub y_top: i64,
    /// Exclusive
    pub y_bottom: i64,
    pub name: String,
    pub index: usize,
}

/// Rows of the current page, rebuilt on every render
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpenFilesIndex {
    entries: Vec<OpenFileEntry>,
}

impl OpenFilesIndex {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(OPEN_FILES_INCREMENT),
        }
    }

    pub fn add(&mut self, y_top: i64, y_bottom: i64, name: impl Into<String>, index: usize) {
        if self.entries.len() == self.entries.capacity() {
            self.entries.reserve_exact(OPEN_FILES_INCREMENT);
        }
        self.entries.push(OpenFileEntry {
            y_top,
            y_bottom,
            name: name.into(),
            index,
        });
    }

    /// First row whose `[y_top, y_bottom)` range contains `y`
    pub fn lookup(&self, y: i64) -> Option<&OpenFileEntry> {
        self.entries
            .iter()
            .find(|entry| y >= entry.y_top && y < entry.y_bottom)
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[OpenFileEntry] {
        &self.entries
    }
}
