//! Time-windowed filesystem scan.
//!
//! [`scan`] walks a directory tree and reports every regular file whose
//! creation timestamp is strictly newer than a cutoff. It is a pure
//! read-only query; the monitor loop owns the cutoff and calls this once
//! per iteration.
//!
//! # Creation-time semantics
//!
//! Creation time is read from [`std::fs::Metadata::created`], which is
//! best-effort: on filesystems or platforms that do not expose a birth
//! time, the last-modification timestamp is used instead. This is a
//! deliberate approximation, not true creation semantics everywhere.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{debug, warn};

/// ctime-style rendering used for the human-readable mapping values.
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Errors that can occur during a scan iteration.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A directory could not be read.
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An entry's metadata or timestamps could not be read.
    #[error("failed to read metadata for {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Returns every regular file under `root_dir` created strictly after
/// `cutoff`, mapped to a human-readable rendering of its creation time.
///
/// Traversal descends into subdirectories; directories, symlinks, and
/// other non-regular entries are never reported themselves. A
/// permission-denied error on a subdirectory is logged and the subtree
/// skipped; any other I/O error propagates.
///
/// # Errors
///
/// Returns a [`ScanError`] if `root_dir` cannot be read (including when
/// it does not exist) or a file's timestamps are unavailable.
pub fn scan(root_dir: &Path, cutoff: SystemTime) -> Result<BTreeMap<String, String>> {
    let mut new_files = BTreeMap::new();
    scan_recursive(root_dir, cutoff, &mut new_files)?;
    debug!(
        root_dir = %root_dir.display(),
        new_file_count = new_files.len(),
        "Scan complete"
    );
    Ok(new_files)
}

fn scan_recursive(
    dir: &Path,
    cutoff: SystemTime,
    new_files: &mut BTreeMap<String, String>,
) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(source) => return Err(ScanError::Metadata { path, source }),
        };

        if file_type.is_dir() {
            match scan_recursive(&path, cutoff, new_files) {
                Ok(()) => {}
                Err(ScanError::ReadDir { path, source })
                    if source.kind() == io::ErrorKind::PermissionDenied =>
                {
                    warn!(dir = %path.display(), "Permission denied, skipping directory");
                }
                Err(e) => return Err(e),
            }
        } else if file_type.is_file() {
            let created = creation_time(&path)?;
            if created > cutoff {
                new_files.insert(
                    path.display().to_string(),
                    format_timestamp(created),
                );
            }
        }
        // Symlinks and special files are intentionally not reported.
    }

    Ok(())
}

/// Reads a file's creation time, substituting the modification time on
/// platforms where no birth time is recorded.
pub fn creation_time(path: &Path) -> Result<SystemTime> {
    let metadata = fs::metadata(path).map_err(|source| ScanError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;

    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map_err(|source| ScanError::Metadata {
            path: path.to_path_buf(),
            source,
        })
}

fn format_timestamp(timestamp: SystemTime) -> String {
    DateTime::<Local>::from(timestamp)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
