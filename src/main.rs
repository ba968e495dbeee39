//! # mark-dups CLI
//!
//! Command-line interface for the duplicate file marker.
//!
//! ## Usage
//! ```bash
//! mark-dups scan ~/Downloads --session downloads.mdc
//! mark-dups list downloads.mdc --sort name
//! mark-dups mark downloads.mdc --yes
//! ```

mod cli;

use mark_duplicates::Result;

fn main() -> Result<()> {
    cli::run()
}
