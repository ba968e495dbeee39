//! # Marker Module
//!
//! Renames every flagged duplicate so it can be reviewed and deleted by hand.
//!
//! The marker goes in front of the extension: `a.b.txt` becomes
//! `a.b.DELETE.txt`, and a name without a dot gets it appended
//! (`noext` becomes `noext.DELETE`). Nothing is ever deleted.
//!
//! The operation does not look at the file system to find out whether a
//! file was already marked. Callers keep an "already marked" flag and refuse
//! a second run until the directory is rescanned.

use crate::core::store::RecordStore;
use crate::error::MarkError;
use crate::events::{Event, EventSender, MarkEvent};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Inserted before the extension of every duplicate
pub const DELETE_MARKER: &str = ".DELETE";

/// Name a duplicate is renamed to
pub fn marked_name(name: &str) -> String {
    match name.rfind('.') {
        Some(dot) => format!("{}{}{}", &name[..dot], DELETE_MARKER, &name[dot..]),
        None => format!("{name}{DELETE_MARKER}"),
    }
}

/// One completed rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Outcome of a marking run
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarkReport {
    pub renamed: Vec<Rename>,
}

/// Rename every record flagged as a duplicate inside `directory`.
///
/// Stops at the first failure; renames already done stay done and the
/// error is wrapped in [`MarkError::Incomplete`]. An existing file with the
/// target name is never overwritten.
pub fn mark_duplicates(
    store: &RecordStore,
    directory: &Path,
    events: &EventSender,
) -> Result<MarkReport, MarkError> {
    if store.is_empty() {
        return Err(MarkError::NothingScanned);
    }

    let mut report = MarkReport::default();

    for record in store.records().iter().filter(|r| r.is_duplicate) {
        let target = marked_name(&record.name);
        if let Err(error) = rename_one(directory, &record.name, &target) {
            if report.renamed.is_empty() {
                return Err(error);
            }
            warn!(renamed = report.renamed.len(), %error, "Marking stopped partway");
            return Err(MarkError::Incomplete {
                renamed: report.renamed.len(),
                source: Box::new(error),
            });
        }

        debug!(from = %record.name, to = %target, "Marked duplicate");
        events.send(Event::Mark(MarkEvent::Renamed {
            from: record.name.clone(),
            to: target.clone(),
        }));
        report.renamed.push(Rename {
            from: record.name.clone(),
            to: target,
        });
    }

    info!(renamed = report.renamed.len(), directory = %directory.display(), "Marking complete");
    events.send(Event::Mark(MarkEvent::Completed {
        renamed: report.renamed.len(),
    }));

    Ok(report)
}

fn rename_one(directory: &Path, name: &str, target: &str) -> Result<(), MarkError> {
    let from = directory.join(name);
    let to = directory.join(target);

    if to.exists() {
        return Err(MarkError::TargetExists { from, to });
    }

    fs::rename(&from, &to).map_err(|source| MarkError::Rename { from, to, source })
}
