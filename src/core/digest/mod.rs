//! # Digest Module
//!
//! Computes SHA-1 content digests for files.
//!
//! Files are streamed through the hasher in fixed-size blocks, so memory
//! use does not grow with the file. Digests are rendered the way the record
//! store and the session file keep them: uppercase hex byte pairs separated
//! by single spaces (`"A9 99 3E ..."`, 59 characters for 20 bytes).
//!
//! ## Example
//! ```rust,ignore
//! use mark_duplicates::core::digest::digest_file;
//!
//! let digest = digest_file(Path::new("report.pdf"))?;
//! println!("{digest}");
//! ```

pub mod selftest;

pub use selftest::{run_rfc3174_suite, verify_file, TestVector, VerifyReport, RFC3174_VECTORS};

use crate::error::DigestError;
use sha1::{Digest, Sha1};
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Length of a SHA-1 digest in bytes
pub const DIGEST_LEN: usize = 20;

/// Length of a rendered digest: two hex digits per byte, one space between bytes
pub const DIGEST_TEXT_LEN: usize = DIGEST_LEN * 3 - 1;

/// Bytes read from a file per hasher update
pub const BLOCK_LEN: usize = 1024;

/// Largest message SHA-1 can digest; its bit length must fit in 64 bits
pub const MAX_INPUT_BYTES: u64 = u64::MAX / 8;

/// A computed 160-bit content digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw digest bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Render as spaced uppercase hex, e.g. `"A9 99 3E 36 ..."`
    pub fn to_hex(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Accepting,
    Finalized,
}

/// Incremental SHA-1 engine with an explicit call sequence.
///
/// Input may be fed any number of times until `result` is called; after
/// that both `input` and `result` fail with [`DigestError::StateError`]
/// until the engine is `reset`.
pub struct DigestEngine {
    hasher: Sha1,
    length: u64,
    state: EngineState,
}

impl DigestEngine {
    /// Create an engine ready to accept input
    pub fn new() -> Self {
        Self {
            hasher: Sha1::new(),
            length: 0,
            state: EngineState::Accepting,
        }
    }

    /// Return the engine to its initial state
    pub fn reset(&mut self) {
        self.hasher = Sha1::new();
        self.length = 0;
        self.state = EngineState::Accepting;
    }

    /// Number of bytes accepted since the last reset
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Feed a block of message bytes
    pub fn input(&mut self, data: &[u8]) -> Result<(), DigestError> {
        if self.state == EngineState::Finalized {
            return Err(DigestError::StateError);
        }

        let length = self
            .length
            .checked_add(data.len() as u64)
            .filter(|total| *total <= MAX_INPUT_BYTES)
            .ok_or(DigestError::InputTooLong {
                limit: MAX_INPUT_BYTES,
            })?;

        self.hasher.update(data);
        self.length = length;
        Ok(())
    }

    /// Finalize and produce the digest
    pub fn result(&mut self) -> Result<ContentDigest, DigestError> {
        if self.state == EngineState::Finalized {
            return Err(DigestError::StateError);
        }
        self.state = EngineState::Finalized;

        let output = std::mem::take(&mut self.hasher).finalize();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&output);
        Ok(ContentDigest(bytes))
    }

    /// Stream a reader through the engine in `BLOCK_LEN` blocks.
    ///
    /// `path` only labels read failures.
    pub fn input_reader<R: Read>(&mut self, reader: &mut R, path: &Path) -> Result<(), DigestError> {
        let mut block = [0u8; BLOCK_LEN];
        loop {
            let read = match reader.read(&mut block) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(DigestError::Read {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            };
            self.input(&block[..read])?;
        }
    }
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the digest of everything a reader yields
pub fn digest_reader<R: Read>(reader: &mut R, label: &Path) -> Result<ContentDigest, DigestError> {
    let mut engine = DigestEngine::new();
    engine.input_reader(reader, label)?;
    engine.result()
}

/// Compute the digest of a file's contents
pub fn digest_file(path: &Path) -> Result<ContentDigest, DigestError> {
    let mut file = File::open(path).map_err(|source| DigestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    digest_reader(&mut file, path)
}
