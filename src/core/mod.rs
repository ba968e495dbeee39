//! # Core Module
//!
//! The UI-agnostic duplicate detection engine.
//!
//! ## Modules
//! - `digest` - SHA-1 content digests and the RFC 3174 self-test
//! - `store` - Record store, sort orders and session files
//! - `scanner` - Lists a directory into unhashed records
//! - `pipeline` - Orchestrates enumeration, parallel hashing and sorting
//! - `marker` - Renames flagged duplicates
//! - `reporter` - Renders pages of the listing
//! - `session` - Store, view state and marked flag together

pub mod digest;
pub mod marker;
pub mod pipeline;
pub mod reporter;
pub mod scanner;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use digest::ContentDigest;
pub use pipeline::{CancellationToken, Pipeline, PipelineResult};
pub use session::Session;
pub use store::{FileRecord, RecordStore, SharedStore, SortMode, ViewState};
