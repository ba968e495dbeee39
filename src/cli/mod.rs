//! # CLI Module
//!
//! Command-line interface for the duplicate file marker.
//!
//! ## Usage
//! ```bash
//! # Scan a directory and keep the results
//! mark-dups scan ~/Downloads --session downloads.mdc
//!
//! # Page through the results sorted by name
//! mark-dups list downloads.mdc --sort name
//!
//! # Keep a file the scan flagged
//! mark-dups set downloads.mdc 14 --keep
//!
//! # Rename the flagged files
//! mark-dups mark downloads.mdc --yes
//!
//! # Check the digest engine
//! mark-dups selftest --repeat 1000
//! ```

mod output;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use mark_duplicates::core::digest::{run_rfc3174_suite, verify_file, VerifyReport};
use mark_duplicates::core::pipeline::{
    CancellationToken, Pipeline, DEFAULT_POLL_INTERVAL, DEFAULT_WORKERS,
};
use mark_duplicates::core::reporter::PageLayout;
use mark_duplicates::core::store::SortMode;
use mark_duplicates::core::Session;
use mark_duplicates::error::{MarkDuplicatesError, Result};
use mark_duplicates::events::{
    null_sender, Event, EventChannel, HashEvent, MarkEvent, PipelineEvent, ScanEvent,
};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Mark Duplicates - find identical files and flag the extra copies
#[derive(Parser, Debug)]
#[command(name = "mark-dups")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, default_value = "pretty", global = true)]
    output: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash every file in a directory and flag identical copies
    Scan {
        /// Directory to scan (not recursive)
        directory: PathBuf,

        /// Number of hashing workers
        #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,

        /// How often progress is refreshed, in milliseconds
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
        poll_ms: u64,

        /// Save the results to this session file
        #[arg(short, long)]
        session: Option<PathBuf>,

        /// Include hidden files
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        include_hidden: bool,
    },

    /// Show one page of a saved session
    List {
        /// Session file
        session: PathBuf,

        /// Re-sort before listing (saved back to the session)
        #[arg(long)]
        sort: Option<SortArg>,

        /// First record on the page
        #[arg(long)]
        start: Option<usize>,

        /// Record to highlight
        #[arg(long)]
        select: Option<usize>,

        /// Page height in lines (defaults to the terminal height)
        #[arg(long)]
        rows: Option<usize>,
    },

    /// Override the duplicate flag of one record
    #[command(group(ArgGroup::new("flag").required(true).args(["duplicate", "keep"])))]
    Set {
        /// Session file
        session: PathBuf,

        /// Record index, as shown by `list`
        index: usize,

        /// Flag the record for marking
        #[arg(long)]
        duplicate: bool,

        /// Keep the record
        #[arg(long)]
        keep: bool,
    },

    /// Rename every flagged file with a .DELETE marker
    Mark {
        /// Session file
        session: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Verify the SHA-1 engine against the RFC 3174 test vectors
    Selftest {
        /// Hash each vector this many times (0 = one pass, no checks)
        #[arg(short, long, default_value_t = 1)]
        repeat: u32,

        /// Time one pass over a large file
        #[arg(long)]
        large_file: Option<PathBuf>,

        /// Data files to verify against their sibling .chk files
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    /// SHA-1 digest, then file name
    Digest,
    /// File name alone
    Name,
    /// Last write date and time, then file name
    Date,
    /// Size, then file name
    Size,
}

impl From<SortArg> for SortMode {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Digest => SortMode::ByDigest,
            SortArg::Name => SortMode::ByName,
            SortArg::Date => SortMode::ByDateTime,
            SortArg::Size => SortMode::BySize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (names only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    mark_duplicates::init_tracing(if cli.verbose { "debug" } else { "warn" });

    match cli.command {
        Commands::Scan {
            directory,
            workers,
            poll_ms,
            session,
            include_hidden,
        } => run_scan(
            &directory,
            workers,
            Duration::from_millis(poll_ms),
            session.as_deref(),
            include_hidden,
            cli.output,
            cli.verbose,
        ),
        Commands::List {
            session,
            sort,
            start,
            select,
            rows,
        } => run_list(&session, sort.map(Into::into), start, select, rows, cli.output),
        Commands::Set {
            session,
            index,
            duplicate,
            keep: _,
        } => run_set(&session, index, duplicate, cli.output),
        Commands::Mark { session, yes } => run_mark(&session, yes, cli.output, cli.verbose),
        Commands::Selftest {
            repeat,
            large_file,
            files,
        } => run_selftest(repeat, large_file.as_deref(), &files, cli.output),
    }
}

fn run_scan(
    directory: &Path,
    workers: usize,
    poll_interval: Duration,
    session_path: Option<&Path>,
    include_hidden: bool,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if output == OutputFormat::Pretty {
        term.write_line(&format!(
            "{} {}",
            style("Mark Duplicates").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let pipeline = Pipeline::builder()
        .directory(directory)
        .workers(workers)
        .poll_interval(poll_interval)
        .include_hidden(include_hidden)
        .build();

    // Ctrl-C stops the hashing workers and discards the partial results
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| MarkDuplicatesError::Config(format!("cannot install Ctrl-C handler: {e}")))?;

    let (sender, receiver) = EventChannel::new();

    let progress = if output == OutputFormat::Pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| MarkDuplicatesError::Config(e.to_string()))?
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{phase}"));
                }
                Event::Scan(ScanEvent::Error { path, message }) if verbose => {
                    pb.println(format!(
                        "  {} {}: {}",
                        style("skipped").yellow(),
                        path.display(),
                        message
                    ));
                }
                Event::Hash(HashEvent::Started { total_files, .. }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.files_processed as u64);
                    if verbose {
                        pb.set_message(p.to_string());
                    } else {
                        pb.set_message(format!("{} MB", p.megabytes_processed));
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled)
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let mut session = Session::new();
    let result = session.scan(&pipeline, &cancel, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let result = result?;

    if result.is_cancelled() {
        term.write_line(&format!(
            "{} Scan cancelled. Nothing was kept.",
            style("✗").red().bold()
        ))
        .ok();
        return Ok(());
    }

    let saved = match session_path {
        Some(path) if !session.store().is_empty() => {
            session.save(path)?;
            Some(path)
        }
        _ => None,
    };

    match output {
        OutputFormat::Pretty => output::print_pretty_scan(&term, &session, &result, saved, verbose),
        OutputFormat::Json => output::print_json_scan(&session, &result, saved),
        OutputFormat::Minimal => output::print_minimal_scan(&session),
    }

    Ok(())
}

fn run_list(
    session_path: &Path,
    sort: Option<SortMode>,
    start: Option<usize>,
    select: Option<usize>,
    rows: Option<usize>,
    output: OutputFormat,
) -> Result<()> {
    let mut session = Session::open(session_path)?;
    let changed = sort.is_some() || start.is_some() || select.is_some();

    if let Some(mode) = sort {
        session.resort(mode)?;
    }
    if let Some(start) = start {
        session.set_start(start);
    }
    if let Some(select) = select {
        session.select(select);
    }

    let lines = rows.unwrap_or_else(|| Term::stdout().size().0 as usize);
    let layout = PageLayout::terminal(lines.max(3));
    let page = session.page(layout);

    if changed {
        session.save(session_path)?;
    }

    match output {
        OutputFormat::Pretty => output::print_pretty_page(&page, layout),
        OutputFormat::Json => output::print_json(&page),
        OutputFormat::Minimal => {
            for line in page.to_lines(layout) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn run_set(session_path: &Path, index: usize, duplicate: bool, output: OutputFormat) -> Result<()> {
    let mut session = Session::open(session_path)?;
    session.set_duplicate(index, duplicate)?;
    session.save(session_path)?;

    let record = session.record(index)?;
    match output {
        OutputFormat::Pretty => output::print_pretty_record(index, &record),
        OutputFormat::Json => output::print_json(&record),
        OutputFormat::Minimal => println!("{}", record.name),
    }

    Ok(())
}

fn run_mark(session_path: &Path, yes: bool, output: OutputFormat, verbose: bool) -> Result<()> {
    let term = Term::stderr();
    let mut session = Session::open(session_path)?;
    let flagged = session.store().lock().duplicate_count();

    if !yes {
        if !term.is_term() {
            return Err(MarkDuplicatesError::Config(
                "refusing to mark without --yes when not attached to a terminal".to_string(),
            ));
        }
        term.write_str(&format!(
            "Rename {} flagged file(s) in {}? [y/N] ",
            style(flagged).cyan(),
            output::display_path(&session.view().directory)
        ))
        .ok();
        let answer = term.read_line().unwrap_or_default();
        if !answer.trim().eq_ignore_ascii_case("y") {
            term.write_line("Nothing was renamed.").ok();
            return Ok(());
        }
    }

    let events = if verbose && output == OutputFormat::Pretty {
        let (sender, receiver) = EventChannel::new();
        let listener = thread::spawn(move || {
            for event in receiver.iter() {
                if let Event::Mark(MarkEvent::Renamed { from, to }) = event {
                    eprintln!("  {} {} -> {}", style("renamed").dim(), from, to);
                }
            }
        });
        Some((sender, listener))
    } else {
        None
    };

    let result = match &events {
        Some((sender, _)) => session.mark(sender),
        None => session.mark(&null_sender()),
    };

    if let Some((sender, listener)) = events {
        drop(sender);
        listener.join().ok();
    }

    let report = result?;
    match output {
        OutputFormat::Pretty => output::print_pretty_mark(&term, &report),
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Minimal => {
            for rename in &report.renamed {
                println!("{}", rename.to);
            }
        }
    }

    Ok(())
}

fn run_selftest(
    repeat: u32,
    large_file: Option<&Path>,
    files: &[PathBuf],
    output: OutputFormat,
) -> Result<()> {
    let mut reports: Vec<VerifyReport> = run_rfc3174_suite(repeat)?;

    for file in files {
        reports.push(verify_file(file, repeat)?);
    }

    // A large file has no check file; it is timed with a single pass
    if let Some(path) = large_file {
        reports.push(verify_file(path, 0)?);
    }

    match output {
        OutputFormat::Pretty => output::print_pretty_selftest(&reports),
        OutputFormat::Json => output::print_json_selftest(&reports),
        OutputFormat::Minimal => {
            for report in &reports {
                println!("{}  {}", report.digest, report.name);
            }
        }
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        return Err(MarkDuplicatesError::Config(format!(
            "{failed} of {} digest checks failed",
            reports.len()
        )));
    }

    Ok(())
}
