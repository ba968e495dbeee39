//! # Reporter Module
//!
//! Turns the record store into what a user looks at: a page of rows with a
//! header and a status line, plus the index that maps a vertical position
//! back to the record drawn there.
//!
//! ## Example
//! ```rust,ignore
//! use mark_duplicates::core::reporter::{render_page, PageLayout};
//!
//! let page = render_page(&store, &view, PageLayout::terminal(40));
//! for line in page.to_lines(PageLayout::terminal(40)) {
//!     println!("{line}");
//! }
//! ```

mod listing;
mod open_files;

pub use listing::{format_row, render_page, status_line, Page, PageLayout, PageRow, HEADER};
pub use open_files::{OpenFileEntry, OpenFilesIndex, OPEN_FILES_INCREMENT};
