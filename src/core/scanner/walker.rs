//! Directory listing implementation using walkdir.

use super::{DirectoryScanner, ScanResult};
use crate::core::store::FileRecord;
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use chrono::{DateTime, Local};
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Default width of the right-justified size column
pub const SIZE_WIDTH: usize = 9;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to list files reached through symbolic links
    pub follow_symlinks: bool,
    /// Whether to include dot-files
    pub include_hidden: bool,
    /// Width the size string is right-justified to
    pub size_width: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            size_width: SIZE_WIDTH,
        }
    }
}

/// Format a last-write time as local `mm/dd/yyyy` and `hh:mm`
pub fn format_timestamp(modified: SystemTime) -> (String, String) {
    let local: DateTime<Local> = modified.into();
    (
        local.format("%m/%d/%Y").to_string(),
        local.format("%H:%M").to_string(),
    )
}

/// Scanner implementation using the walkdir crate.
///
/// Lists one directory level; subdirectories are skipped, never entered.
pub struct WalkDirScanner {
    config: ScanConfig,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    fn is_hidden(name: &str) -> bool {
        name.starts_with('.')
    }

    fn check_root(root: &Path) -> Result<(), ScanError> {
        match std::fs::metadata(root) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(ScanError::PermissionDenied {
                    path: root.to_path_buf(),
                })
            }
            Err(source) => Err(ScanError::ReadDirectory {
                path: root.to_path_buf(),
                source,
            }),
        }
    }
}

impl DirectoryScanner for WalkDirScanner {
    fn scan(&self, directory: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(directory, &null_sender())
    }

    fn scan_with_events(&self, directory: &Path, events: &EventSender) -> Result<ScanResult, ScanError> {
        Self::check_root(directory)?;

        events.send(Event::Scan(ScanEvent::Started {
            directory: directory.to_path_buf(),
        }));

        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        let mut result = ScanResult::default();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let error = if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    result.errors.push(error);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() || file_type.is_symlink() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                let error = ScanError::InvalidName {
                    path: entry.path().to_path_buf(),
                };
                events.send(Event::Scan(ScanEvent::Error {
                    path: entry.path().to_path_buf(),
                    message: error.to_string(),
                }));
                result.errors.push(error);
                continue;
            };
            if !self.config.include_hidden && Self::is_hidden(&name) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    let error = ScanError::Metadata {
                        path: entry.path().to_path_buf(),
                        source: std::io::Error::other(e.to_string()),
                    };
                    events.send(Event::Scan(ScanEvent::Error {
                        path: entry.path().to_path_buf(),
                        message: error.to_string(),
                    }));
                    result.errors.push(error);
                    continue;
                }
            };

            let size = metadata.len();
            let (date, time) =
                format_timestamp(metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH));
            let size_text = format!("{:>width$}", size, width = self.config.size_width);

            events.send(Event::Scan(ScanEvent::FileFound {
                name: name.clone(),
                size,
            }));

            result.total_bytes += size;
            result
                .files
                .push(FileRecord::new(String::new(), date, time, size_text, name));
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: result.files.len(),
            total_bytes: result.total_bytes,
        }));

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &TempDir, name: &str, contents: &[u8]) {
        let mut file = File::create(dir.path().join(name)).unwrap();
        file.write_all(contents).unwrap();
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = WalkDirScanner::new(ScanConfig::default());

        let result = scanner.scan(temp_dir.path()).unwrap();

        assert!(result.files.is_empty());
        assert!(result.errors.is_empty());
        assert_eq!(result.total_bytes, 0);
    }

    #[test]
    fn scan_finds_files_with_padded_sizes() {
        let temp_dir = TempDir::new().unwrap();
        create_file(&temp_dir, "b.txt", b"hello");
        create_file(&temp_dir, "a.bin", &[0u8; 1234]);

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 2);
        assert_eq!(result.files[0].name, "a.bin");
        assert_eq!(result.files[0].size, "     1234");
        assert_eq!(result.files[1].size, "        5");
        assert_eq!(result.total_bytes, 1239);
        assert!(result.files.iter().all(|f| f.digest.is_empty() && !f.is_duplicate));
    }

    #[test]
    fn scan_skips_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("nested");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("inner.txt"), b"inner").unwrap();
        create_file(&temp_dir, "top.txt", b"top");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].name, "top.txt");
    }

    #[test]
    fn scan_includes_hidden_files_by_default() {
        let temp_dir = TempDir::new().unwrap();
        create_file(&temp_dir, "visible.txt", b"v");
        create_file(&temp_dir, ".hidden", b"h");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        assert_eq!(scanner.scan(temp_dir.path()).unwrap().files.len(), 2);

        let config = ScanConfig {
            include_hidden: false,
            ..Default::default()
        };
        let result = WalkDirScanner::new(config).scan(temp_dir.path()).unwrap();
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].name, "visible.txt");
    }

    #[test]
    fn size_width_is_configurable() {
        let temp_dir = TempDir::new().unwrap();
        create_file(&temp_dir, "x", b"123");

        let config = ScanConfig {
            size_width: 4,
            ..Default::default()
        };
        let result = WalkDirScanner::new(config).scan(temp_dir.path()).unwrap();
        assert_eq!(result.files[0].size, "   3");
    }

    #[test]
    fn timestamp_formats_month_day_year() {
        let moment = Local.with_ymd_and_hms(2024, 3, 7, 8, 5, 0).unwrap();
        let (date, time) = format_timestamp(moment.into());

        assert_eq!(date, "03/07/2024");
        assert_eq!(time, "08:05");
    }

    #[test]
    fn scan_nonexistent_directory_returns_error() {
        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(Path::new("/nonexistent/path/12345"));

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn scan_of_a_file_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        create_file(&temp_dir, "plain.txt", b"x");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&temp_dir.path().join("plain.txt"));

        assert!(matches!(result, Err(ScanError::NotADirectory { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn scan_skips_names_that_are_not_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        create_file(&temp_dir, "a.txt", b"a");
        let odd = temp_dir.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
        if File::create(&odd).is_err() {
            // Some file systems refuse such names outright
            return;
        }

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].name, "a.txt");
        assert_eq!(result.total_bytes, 1);
        assert!(matches!(
            result.errors.as_slice(),
            [ScanError::InvalidName { path }] if path == &odd
        ));
    }
}
