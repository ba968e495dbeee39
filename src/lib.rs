//! # Mark Duplicates
//!
//! Finds identical files in a directory by content digest and marks the
//! extra copies for deletion.
//!
//! ## Core Philosophy
//! - **Never delete** - duplicates are renamed with a `.DELETE` marker, the
//!   user decides what to remove
//! - **Exact matches only** - files are compared by SHA-1 digest of their
//!   full contents
//! - **Review first** - every duplicate flag can be overridden by hand and a
//!   whole scan can be saved and reopened later
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - Digest engine, record store, hashing pipeline, marking
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{MarkDuplicatesError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies. Logs go to
/// stderr so they never mix with command output. Calling this twice is a
/// no-op.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
