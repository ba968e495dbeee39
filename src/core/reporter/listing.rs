//! Page rendering for the record listing.
//!
//! Positions are in abstract vertical units so the same layout drives a
//! pixel display (`line_height` = font height) or a terminal
//! (`line_height` = 1). In digest order every non-duplicate row is preceded
//! by a blank line, so each group of identical files reads as a block.

use super::open_files::OpenFilesIndex;
use crate::core::store::{RecordStore, SortMode, ViewState};
use serde::Serialize;

/// Column header shown above the rows
pub const HEADER: &str = "SHA-1 Digest-----------------------------------------------   Date------   Time-   -----Size   D   File Name------------------------------------------------------------------------------------------";

const COLUMN_GAP: &str = "   ";

/// Vertical geometry of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    /// Position of the header line
    pub top: i64,
    pub line_height: i64,
    /// Bottom edge; the status line occupies the last `line_height`
    pub bottom: i64,
}

impl PageLayout {
    /// Terminal layout: one unit per line, header on line 0, status on the last line
    pub fn terminal(lines: usize) -> Self {
        Self {
            top: 0,
            line_height: 1,
            bottom: lines as i64,
        }
    }
}

/// One rendered record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRow {
    pub y: i64,
    pub index: usize,
    pub is_duplicate: bool,
    pub is_selected: bool,
    pub text: String,
}

/// A rendered page
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Empty when the store is empty
    pub header: Option<String>,
    pub rows: Vec<PageRow>,
    /// Empty when the store is empty
    pub status: Option<String>,
    /// Selected index after clamping to the visible range
    pub selected_index: usize,
    pub open_files: OpenFilesIndex,
}

impl Page {
    /// Lay the page out as text lines, one per `line_height`, with blank
    /// lines where rows are spaced apart
    pub fn to_lines(&self, layout: PageLayout) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(header) = &self.header {
            lines.push(header.clone());
        }

        let step = layout.line_height.max(1);
        let mut next_y = layout.top + step;
        for row in &self.rows {
            while next_y < row.y {
                lines.push(String::new());
                next_y += step;
            }
            lines.push(row.text.clone());
            next_y = row.y + step;
        }

        if let Some(status) = &self.status {
            lines.push(status.clone());
        }
        lines
    }
}

/// Format one record the way the listing shows it
pub fn format_row(digest: &str, date: &str, time: &str, size: &str, duplicate: bool, name: &str) -> String {
    [digest, date, time, size, if duplicate { "X" } else { "O" }, name].join(COLUMN_GAP)
}

/// Status line for the bottom of the page
pub fn status_line(directory: &str, files: usize, bytes: u64, duplicates: usize, mode: SortMode) -> String {
    format!(
        "Directory: {}     Files: {}     MBytes: {}     Duplicates: {}     Sorted by: {}",
        directory,
        files,
        bytes / 1024 / 1024,
        duplicates,
        mode.label()
    )
}

/// Render the rows that fit on one page, starting at `view.start_index`.
///
/// The selected index is raised to at least the start index, and lowered
/// when it would fall on the last rows of the page.
pub fn render_page(store: &RecordStore, view: &ViewState, layout: PageLayout) -> Page {
    let h = layout.line_height;
    let spacing = if view.sort_mode == SortMode::ByDigest { 2 } else { 1 };
    let mut y = layout.top + h - h * spacing;
    let mut selected = view.selected_index.max(view.start_index);
    let mut open_files = OpenFilesIndex::new();
    let mut rows = Vec::new();

    for (index, record) in store.records().iter().enumerate().skip(view.start_index) {
        y += if record.is_duplicate { h } else { h * spacing };
        if y > layout.bottom - h {
            break;
        }
        if y >= layout.bottom - h - h * spacing {
            selected = selected.min(index);
        }

        rows.push(PageRow {
            y,
            index,
            is_duplicate: record.is_duplicate,
            is_selected: false,
            text: format_row(
                &record.digest,
                &record.date,
                &record.time,
                &record.size,
                record.is_duplicate,
                &record.name,
            ),
        });
        open_files.add(y, y + h, record.name.clone(), index);
    }

    for row in &mut rows {
        row.is_selected = row.index == selected;
    }

    let populated = !store.is_empty();
    Page {
        header: populated.then(|| HEADER.to_string()),
        status: populated.then(|| {
            status_line(
                &view.directory.to_string_lossy(),
                store.len(),
                store.total_size_bytes(),
                store.duplicate_count(),
                view.sort_mode,
            )
        }),
        rows,
        selected_index: selected,
        open_files,
    }
}
