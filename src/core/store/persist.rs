//! Session file format.
//!
//! A session file is line oriented, `|` delimited and `\r\n` terminated:
//!
//! ```text
//! startIndex|selectedIndex|sortMode|directory
//! digest|date|time|size|X|name
//! digest|date|time|size|O|name
//! ```
//!
//! The last field of each line runs to the end of the line and may itself
//! contain `|`. Records load in file order and are neither re-sorted nor
//! re-validated.

use super::{FileRecord, RecordStore, SortMode};
use crate::error::PersistError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Conventional session file name
pub const DEFAULT_SESSION_FILE: &str = "MarkDuplicates.mdc";

const DUPLICATE_FLAG: &str = "X";
const ORIGINAL_FLAG: &str = "O";

/// The view scalars saved alongside the records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// First record shown on the page
    pub start_index: usize,
    /// Highlighted record
    pub selected_index: usize,
    pub sort_mode: SortMode,
    /// Directory the records were scanned from
    pub directory: PathBuf,
}

impl RecordStore {
    /// Write every record, preceded by the view header
    pub fn write_session<W: Write>(&self, view: &ViewState, mut writer: W) -> std::io::Result<()> {
        write!(
            writer,
            "{}|{}|{}|{}\r\n",
            view.start_index,
            view.selected_index,
            view.sort_mode.index(),
            view.directory.to_string_lossy()
        )?;

        for record in self.records() {
            write!(
                writer,
                "{}|{}|{}|{}|{}|{}\r\n",
                record.digest,
                record.date,
                record.time,
                record.size,
                if record.is_duplicate { DUPLICATE_FLAG } else { ORIGINAL_FLAG },
                record.name
            )?;
        }

        writer.flush()
    }

    /// Save to a file, replacing it if it exists
    pub fn save(&self, view: &ViewState, path: &Path) -> Result<(), PersistError> {
        if self.is_empty() {
            return Err(PersistError::NothingToSave);
        }

        let file = File::create(path).map_err(|source| PersistError::Io {
            operation: "create",
            path: path.to_path_buf(),
            source,
        })?;

        self.write_session(view, BufWriter::new(file))
            .map_err(|source| PersistError::Io {
                operation: "write",
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), records = self.len(), "Session saved");
        Ok(())
    }

    /// Replace the contents of the store with a session read from `reader`.
    ///
    /// On any failure the store is left empty. `path` only labels I/O errors.
    pub fn read_session<R: BufRead>(&mut self, reader: R, path: &Path) -> Result<ViewState, PersistError> {
        self.clear();

        match parse_session(reader, path) {
            Ok((view, records)) => {
                for record in records {
                    self.push(record);
                }
                Ok(view)
            }
            Err(error) => {
                self.clear();
                Err(error)
            }
        }
    }

    /// Load a session file, returning its view state
    pub fn load(&mut self, path: &Path) -> Result<ViewState, PersistError> {
        let file = File::open(path).map_err(|source| {
            self.clear();
            PersistError::Io {
                operation: "open",
                path: path.to_path_buf(),
                source,
            }
        })?;

        let view = self.read_session(BufReader::new(file), path)?;
        info!(path = %path.display(), records = self.len(), "Session loaded");
        Ok(view)
    }
}

fn parse_session<R: BufRead>(reader: R, path: &Path) -> Result<(ViewState, Vec<FileRecord>), PersistError> {
    let mut lines = reader.lines().enumerate();

    let header = match lines.next() {
        Some((_, line)) => read_line(line, path)?,
        None => return Err(PersistError::MissingHeader),
    };
    let view = parse_header(&header)?;

    let mut records = Vec::new();
    for (number, line) in lines {
        let line = read_line(line, path)?;
        records.push(parse_detail(&line, number + 1)?);
    }

    debug!(records = records.len(), "Parsed session file");
    Ok((view, records))
}

fn read_line(line: std::io::Result<String>, path: &Path) -> Result<String, PersistError> {
    let mut line = line.map_err(|source| PersistError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    if line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

fn malformed(line: usize, reason: impl Into<String>) -> PersistError {
    PersistError::Malformed {
        line,
        reason: reason.into(),
    }
}

fn parse_header(line: &str) -> Result<ViewState, PersistError> {
    let fields: Vec<&str> = line.splitn(4, '|').collect();
    let &[start, selected, mode, directory] = fields.as_slice() else {
        return Err(malformed(1, format!("expected 4 header fields, found {}", fields.len())));
    };

    let number = |field: &str, what: &str| {
        field
            .trim()
            .parse::<usize>()
            .map_err(|_| malformed(1, format!("{what} is not a number: {field:?}")))
    };

    let mode_index = number(mode, "sort mode")?;
    let sort_mode = u8::try_from(mode_index)
        .ok()
        .and_then(SortMode::from_index)
        .ok_or_else(|| malformed(1, format!("unknown sort mode {mode_index}")))?;

    Ok(ViewState {
        start_index: number(start, "start index")?,
        selected_index: number(selected, "selected index")?,
        sort_mode,
        directory: PathBuf::from(directory),
    })
}

fn parse_detail(line: &str, number: usize) -> Result<FileRecord, PersistError> {
    let fields: Vec<&str> = line.splitn(6, '|').collect();
    let &[digest, date, time, size, flag, name] = fields.as_slice() else {
        return Err(malformed(number, format!("expected 6 fields, found {}", fields.len())));
    };

    let is_duplicate = match flag {
        DUPLICATE_FLAG => true,
        ORIGINAL_FLAG => false,
        other => return Err(malformed(number, format!("duplicate flag must be X or O, found {other:?}"))),
    };

    let mut record = FileRecord::new(digest, date, time, size, name);
    record.is_duplicate = is_duplicate;
    Ok(record)
}
