//! Digest verification and benchmark mode.
//!
//! A verification run hashes the same input `repeat` times, checks that
//! every pass agrees with the first one (data check) and that the final
//! rendered digest equals the expected text (result check). A repeat count
//! of zero is a single timed pass with no checks.

use super::{DigestEngine, DIGEST_TEXT_LEN};
use crate::error::DigestError;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A canned input with its published digest
#[derive(Debug, Clone, Copy)]
pub struct TestVector {
    pub name: &'static str,
    /// Bytes that are repeated to form the message
    pub pattern: &'static [u8],
    /// How many times `pattern` is repeated
    pub pattern_repeat: usize,
    pub expected: &'static str,
}

impl TestVector {
    /// The full message this vector digests
    pub fn message(&self) -> Vec<u8> {
        self.pattern.repeat(self.pattern_repeat)
    }
}

/// The four test cases of RFC 3174, section 7.3
pub const RFC3174_VECTORS: [TestVector; 4] = [
    TestVector {
        name: "Test1",
        pattern: b"abc",
        pattern_repeat: 1,
        expected: "A9 99 3E 36 47 06 81 6A BA 3E 25 71 78 50 C2 6C 9C D0 D8 9D",
    },
    TestVector {
        name: "Test2",
        pattern: b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq",
        pattern_repeat: 1,
        expected: "84 98 3E 44 1C 3B D2 6E BA AE 4A A1 F9 51 29 E5 E5 46 70 F1",
    },
    TestVector {
        name: "Test3",
        pattern: b"a",
        pattern_repeat: 1_000_000,
        expected: "34 AA 97 3C D4 C4 DA A4 F6 1E EB 2B DB AD 27 31 65 34 01 6F",
    },
    TestVector {
        name: "Test4",
        pattern: b"0123456701234567012345670123456701234567012345670123456701234567",
        pattern_repeat: 10,
        expected: "DE A3 56 A2 CD DD 90 C7 A7 EC ED C5 EB B5 63 93 4F 46 04 52",
    },
];

/// Outcome of a verification run
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub name: String,
    /// Rendered digest of the last pass
    pub digest: String,
    /// Requested repeat count (0 = single unchecked pass)
    pub iterations: u32,
    pub elapsed: Duration,
    /// Every pass matched the first; `None` when unchecked
    pub data_check: Option<bool>,
    /// Final digest matched the expected text; `None` when unchecked
    pub result_check: Option<bool>,
}

impl VerifyReport {
    /// True unless a performed check failed
    pub fn passed(&self) -> bool {
        self.data_check.unwrap_or(true) && self.result_check.unwrap_or(true)
    }
}

fn verdict(check: Option<bool>) -> &'static str {
    match check {
        Some(true) => "PASSED",
        Some(false) => "FAILED",
        None => "SKIPPED",
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.digest)?;
        if self.iterations == 0 {
            return Ok(());
        }

        let elapsed_ms = self.elapsed.as_secs_f64() * 1000.0;
        writeln!(
            f,
            "Iterations: {}   Elapsed: {:.3} mS   One Iteration: {:.3} mS",
            self.iterations,
            elapsed_ms,
            elapsed_ms / self.iterations as f64
        )?;
        write!(
            f,
            "Data check: {}   Result check: {}",
            verdict(self.data_check),
            verdict(self.result_check)
        )
    }
}

/// Hash the source `iterations` times (once when zero) and check the results.
///
/// `open` is called once per pass and must yield the same bytes each time.
pub fn verify_source<F, R>(
    name: &str,
    iterations: u32,
    expected: Option<&str>,
    label: &Path,
    mut open: F,
) -> Result<VerifyReport, DigestError>
where
    F: FnMut() -> Result<R, DigestError>,
    R: Read,
{
    let start = Instant::now();
    let mut engine = DigestEngine::new();
    let mut first = None;
    let mut data_ok = true;
    let mut last = None;

    for _ in 0..iterations.max(1) {
        let mut reader = open()?;
        engine.reset();
        engine.input_reader(&mut reader, label)?;
        let digest = engine.result()?;

        match first {
            None => first = Some(digest),
            Some(pass_one) => data_ok &= pass_one == digest,
        }
        last = Some(digest);
    }

    let digest = last.map(|d| d.to_hex()).unwrap_or_default();
    let checked = iterations > 0;

    Ok(VerifyReport {
        name: name.to_string(),
        result_check: match (checked, expected) {
            (true, Some(expected)) => Some(digest == expected),
            _ => None,
        },
        data_check: checked.then_some(data_ok),
        digest,
        iterations,
        elapsed: start.elapsed(),
    })
}

/// Run one canned vector from memory
pub fn run_vector(vector: &TestVector, iterations: u32) -> Result<VerifyReport, DigestError> {
    let message = vector.message();
    verify_source(
        vector.name,
        iterations,
        Some(vector.expected),
        Path::new(vector.name),
        || Ok(Cursor::new(message.as_slice())),
    )
}

/// Run all four RFC 3174 vectors
pub fn run_rfc3174_suite(iterations: u32) -> Result<Vec<VerifyReport>, DigestError> {
    RFC3174_VECTORS
        .iter()
        .map(|vector| run_vector(vector, iterations))
        .collect()
}

/// Path of the expected-digest file for a data file: `Test1.dat` -> `Test1.chk`
pub fn check_file_path(data_path: &Path) -> PathBuf {
    data_path.with_extension("chk")
}

/// Read the expected rendered digest from a check file
pub fn read_check_file(path: &Path) -> Result<String, DigestError> {
    let mut file = File::open(path).map_err(|source| DigestError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut buffer = vec![0u8; DIGEST_TEXT_LEN];
    let mut filled = 0;
    while filled < DIGEST_TEXT_LEN {
        match file.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(source) => {
                return Err(DigestError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    if filled != DIGEST_TEXT_LEN {
        return Err(DigestError::CheckFile {
            path: path.to_path_buf(),
            reason: format!("expected {} bytes, found {}", DIGEST_TEXT_LEN, filled),
        });
    }

    String::from_utf8(buffer).map_err(|_| DigestError::CheckFile {
        path: path.to_path_buf(),
        reason: "not a hex digest".to_string(),
    })
}

/// Verify a data file against its sibling `.chk` file.
///
/// With `iterations == 0` the file is hashed once and no check file is read,
/// which is how a single large file is timed.
pub fn verify_file(path: &Path, iterations: u32) -> Result<VerifyReport, DigestError> {
    let expected = if iterations > 0 {
        Some(read_check_file(&check_file_path(path))?)
    } else {
        None
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    verify_source(&name, iterations, expected.as_deref(), path, || {
        File::open(path).map_err(|source| DigestError::Open {
            path: path.to_path_buf(),
            source,
        })
    })
}
