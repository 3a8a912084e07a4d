//! Process logging setup.
//!
//! All operational events go to the configured log file, never to a
//! terminal. Events are written as JSON, one record per line, each
//! carrying an RFC 3339 timestamp and the message fields. The same file
//! is what the notifier attaches to outgoing notifications.
//!
//! The filter defaults to `info` and can be overridden through `RUST_LOG`.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber, appending JSON records to
/// `log_file`.
///
/// # Errors
///
/// Fails if the log file cannot be opened for appending or a global
/// subscriber is already installed.
pub fn init(log_file: &Path) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(())
}
