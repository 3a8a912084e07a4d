//! Error types for the file sentinel.
//!
//! Each module defines its own error enum; this module ties them together
//! into the crate-level [`SentinelError`] used by the monitor loop and the
//! binary entry point.

use thiserror::Error;

use crate::config::ConfigError;
use crate::notifier::NotifyError;
use crate::scanner::ScanError;

/// Errors that can occur during sentinel operations.
///
/// Scan and notification failures are deliberately fatal: the loop has no
/// retry policy, so an error propagates out of [`crate::monitor::Monitor::run`]
/// and terminates the process, which is expected to be restarted externally.
#[derive(Error, Debug)]
pub enum SentinelError {
    /// Configuration loading failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A scan iteration failed.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// Notification delivery failed.
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for sentinel operations.
pub type Result<T> = std::result::Result<T, SentinelError>;
