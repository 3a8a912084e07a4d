//! File Sentinel - new-file watchdog for a directory tree.
//!
//! The sentinel polls a directory tree on a fixed interval and classifies
//! files as new-since-last-check using creation timestamps. When an
//! iteration finds new files they are logged; when it finds none, an
//! operator is notified with the current log file attached.
//!
//! # Modules
//!
//! - [`config`]: `config.json` loading and defaulting
//! - [`scanner`]: time-windowed filesystem scan
//! - [`monitor`]: the sleep-scan-decide loop
//! - [`notifier`]: notification delivery (SMTP or webhook)
//! - [`logging`]: structured log setup writing to the configured file
//! - [`error`]: crate-level error type

pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod notifier;
pub mod scanner;

pub use config::{Config, ConfigError};
pub use error::{Result, SentinelError};
pub use monitor::Monitor;
pub use notifier::{EmailNotifier, Notifier, NotifyError, WebhookNotifier};
pub use scanner::{scan, ScanError};
