//! Result printing for each output format.

use console::{style, Term};
use mark_duplicates::core::digest::VerifyReport;
use mark_duplicates::core::marker::MarkReport;
use mark_duplicates::core::pipeline::PipelineResult;
use mark_duplicates::core::reporter::{format_row, Page, PageLayout};
use mark_duplicates::core::{FileRecord, Session};
use serde::Serialize;
use std::path::Path;

/// A run of records with the same digest, in digest order
struct DuplicateGroup<'a> {
    kept: &'a FileRecord,
    duplicates: Vec<&'a FileRecord>,
}

/// Group a digest-sorted listing: every non-duplicate starts a new group
fn duplicate_groups(records: &[FileRecord]) -> Vec<DuplicateGroup<'_>> {
    let mut groups: Vec<DuplicateGroup<'_>> = Vec::new();
    for record in records {
        if record.is_duplicate {
            if let Some(group) = groups.last_mut() {
                group.duplicates.push(record);
                continue;
            }
        }
        groups.push(DuplicateGroup {
            kept: record,
            duplicates: Vec::new(),
        });
    }
    groups.retain(|g| !g.duplicates.is_empty());
    groups
}

pub(super) fn print_pretty_scan(
    term: &Term,
    session: &Session,
    result: &PipelineResult,
    saved: Option<&Path>,
    verbose: bool,
) {
    let store = session.store().lock();
    let savings: u64 = store
        .records()
        .iter()
        .filter(|r| r.is_duplicate)
        .map(FileRecord::size_bytes)
        .sum();

    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files hashed in {:.1}s ({})",
        style(result.files_hashed).cyan(),
        result.duration_ms as f64 / 1000.0,
        format_bytes(result.total_bytes)
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate files",
        style(result.duplicate_count).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} potential space savings",
        style(format_bytes(savings)).yellow()
    ))
    .ok();
    if !result.errors.is_empty() {
        term.write_line(&format!(
            "  {} entries skipped",
            style(result.errors.len()).dim()
        ))
        .ok();
    }
    term.write_line("").ok();

    if verbose {
        for error in &result.errors {
            term.write_line(&format!("  {} {}", style("skipped").yellow(), error))
                .ok();
        }
    }

    let groups = duplicate_groups(store.records());
    if groups.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("🎉").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for group in &groups {
            term.write_line(&format!(
                "  {} ({} copies, {} each)",
                style(&group.kept.digest).bold(),
                group.duplicates.len() + 1,
                format_bytes(group.kept.size_bytes())
            ))
            .ok();
            term.write_line(&format!("    {} {}", style("★").green(), group.kept.name))
                .ok();
            for duplicate in &group.duplicates {
                term.write_line(&format!("    {} {}", style("○").dim(), duplicate.name))
                    .ok();
            }
            term.write_line("").ok();
        }
    }

    if let Some(path) = saved {
        term.write_line(&format!(
            "Session saved to {}",
            style(display_path(path)).cyan()
        ))
        .ok();
    }

    term.write_line(&format!(
        "{}",
        style("Remember: Nothing was renamed. Review the flags, then run `mark-dups mark`.").dim()
    ))
    .ok();
}

pub(super) fn print_json_scan(session: &Session, result: &PipelineResult, saved: Option<&Path>) {
    let store = session.store().lock();
    let output = serde_json::json!({
        "directory": session.view().directory,
        "total_files": result.total_files,
        "total_bytes": result.total_bytes,
        "files_hashed": result.files_hashed,
        "duplicate_count": result.duplicate_count,
        "duration_ms": result.duration_ms,
        "errors": result.errors,
        "session": saved,
        "records": store.records(),
    });

    print_json(&output);
}

pub(super) fn print_minimal_scan(session: &Session) {
    let store = session.store().lock();
    for record in store.records().iter().filter(|r| r.is_duplicate) {
        println!("{}", record.name);
    }
}

/// Print a page the way the listing lays it out, one terminal line per unit
pub(super) fn print_pretty_page(page: &Page, layout: PageLayout) {
    let Some(header) = &page.header else {
        println!("{}", style("No files to show. Scan first.").dim());
        return;
    };
    println!("{}", style(header).bold());

    let mut next_y = layout.top + layout.line_height;
    for row in &page.rows {
        while next_y < row.y {
            println!();
            next_y += layout.line_height;
        }

        let text = style(&row.text);
        let text = if row.is_duplicate { text.yellow() } else { text };
        let text = if row.is_selected { text.reverse() } else { text };
        println!("{text}");
        next_y = row.y + layout.line_height;
    }

    if let Some(status) = &page.status {
        println!("{}", style(status).dim());
    }
}

pub(super) fn print_pretty_record(index: usize, record: &FileRecord) {
    let line = format_row(
        &record.digest,
        &record.date,
        &record.time,
        &record.size,
        record.is_duplicate,
        &record.name,
    );
    let verdict = if record.is_duplicate {
        style("flagged").yellow()
    } else {
        style("kept").green()
    };
    println!("{} {} {}", style(format!("#{index}")).bold(), verdict, line);
}

pub(super) fn print_pretty_mark(term: &Term, report: &MarkReport) {
    term.write_line(&format!(
        "{} Marked {} file(s) for deletion",
        style("✓").green().bold(),
        style(report.renamed.len()).cyan()
    ))
    .ok();
    for rename in &report.renamed {
        term.write_line(&format!("    {} -> {}", rename.from, style(&rename.to).yellow()))
            .ok();
    }
    term.write_line(&format!(
        "{}",
        style("Nothing was deleted. Rescan to see the results.").dim()
    ))
    .ok();
}

pub(super) fn print_pretty_selftest(reports: &[VerifyReport]) {
    for report in reports {
        let verdict = if report.passed() {
            style("✓").green().bold()
        } else {
            style("✗").red().bold()
        };
        println!("{} {}", verdict, style(&report.name).bold());
        for line in report.to_string().lines() {
            println!("    {line}");
        }
    }
}

pub(super) fn print_json_selftest(reports: &[VerifyReport]) {
    let output: Vec<_> = reports
        .iter()
        .map(|r| {
            serde_json::json!({
                "name": r.name,
                "digest": r.digest,
                "iterations": r.iterations,
                "elapsed_ms": r.elapsed.as_secs_f64() * 1000.0,
                "data_check": r.data_check,
                "result_check": r.result_check,
                "passed": r.passed(),
            })
        })
        .collect();

    print_json(&output);
}

pub(super) fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("{} {}", style("error:").red().bold(), e),
    }
}

/// Shorten paths under the home directory to `~/...`
pub(super) fn display_path(path: &Path) -> String {
    match dirs::home_dir().map(|home| path.strip_prefix(home).map(Path::to_path_buf)) {
        Some(Ok(relative)) => format!("~/{}", relative.display()),
        _ => path.display().to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
