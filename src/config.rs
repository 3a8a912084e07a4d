//! Configuration for the file sentinel.
//!
//! Configuration lives in a `config.json` file read from the current working
//! directory by convention; the process takes no CLI arguments.
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | `directory_of_interest` | path | Root directory scanned each iteration |
//! | `check_time_interval` | minutes | Sleep duration between iterations (> 0) |
//! | `log_file_location` | path | Append-only log destination, also attached to notifications |
//! | `email_receiver` | string | Notification recipient address |
//! | `email_sender` | string | Notification sender address |
//! | `email_password` | string | Credential for the SMTP submission |
//! | `webhook_url` | string (optional) | If set, notify via HTTP POST instead of SMTP |
//!
//! If the file is absent a default is synthesized from the current working
//! directory and the `LOGGER_EMAIL_*` environment variables, persisted to
//! disk, and read back. Any other read or parse failure is a fatal startup
//! error.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Config file name, resolved against the current working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Default check interval in minutes.
const DEFAULT_CHECK_INTERVAL_MINS: u64 = 15;

/// Default log file name relative to the working directory.
const DEFAULT_LOG_FILE: &str = "sentinel.log";

/// Environment variable for the notification recipient.
const ENV_EMAIL_RECEIVER: &str = "LOGGER_EMAIL_RECEIVER";

/// Environment variable for the notification sender.
const ENV_EMAIL_SENDER: &str = "LOGGER_EMAIL_SENDER";

/// Environment variable for the sender credential.
const ENV_EMAIL_PASSWORD: &str = "LOGGER_EMAIL_PASSWORD";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the config file failed for a reason other than
    /// the file being absent.
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),

    /// The config file exists but is not valid JSON for [`Config`].
    #[error("malformed config file: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A field has a value outside its allowed range.
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// The working directory could not be determined while synthesizing
    /// a default configuration.
    #[error("failed to determine working directory: {0}")]
    NoWorkingDirectory(#[source] io::Error),
}

/// Immutable configuration record, created once at startup.
///
/// Field order is the serialization order of the persisted JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root directory scanned each iteration.
    pub directory_of_interest: PathBuf,

    /// Minutes to sleep between scan iterations. Must be positive.
    pub check_time_interval: u64,

    /// Append-only structured log destination; also attached to
    /// notification emails.
    pub log_file_location: PathBuf,

    /// Notification recipient address.
    pub email_receiver: String,

    /// Notification sender address.
    pub email_sender: String,

    /// Credential for the sending transport.
    pub email_password: String,

    /// Optional webhook endpoint. When set, notifications are delivered by
    /// HTTP POST instead of SMTP. Omitted from default configs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl Config {
    /// Loads configuration from `path`, synthesizing and persisting a
    /// default if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file exists but cannot be read or
    /// parsed, if `check_time_interval` is zero, or if the default cannot
    /// be written.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config: Config = serde_json::from_str(&contents)?;
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "Config file not found, creating default"
                );
                Self::default_from_env()?.persist(path)?;

                // Read back what was written rather than trusting the
                // in-memory value, so a second load sees identical state.
                let contents = fs::read_to_string(path)?;
                let config: Config = serde_json::from_str(&contents)?;
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Synthesizes a default configuration from the current working
    /// directory and the `LOGGER_EMAIL_*` environment variables.
    fn default_from_env() -> Result<Self, ConfigError> {
        let cwd = env::current_dir().map_err(ConfigError::NoWorkingDirectory)?;

        Ok(Self {
            directory_of_interest: cwd.clone(),
            check_time_interval: DEFAULT_CHECK_INTERVAL_MINS,
            log_file_location: cwd.join(DEFAULT_LOG_FILE),
            email_receiver: env_or(ENV_EMAIL_RECEIVER, "receiver@gmail.com"),
            email_sender: env_or(ENV_EMAIL_SENDER, "sender@gmail.com"),
            email_password: env_or(ENV_EMAIL_PASSWORD, "default_password"),
            webhook_url: None,
        })
    }

    /// Writes the configuration to `path` as JSON with 4-space indentation
    /// and field-declaration ordering.
    fn persist(&self, path: &Path) -> Result<(), ConfigError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        fs::write(path, buf)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.check_time_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "check_time_interval".to_string(),
                message: "interval must be at least 1 minute".to_string(),
            });
        }
        Ok(())
    }
}

/// Reads an environment variable, falling back to a placeholder literal.
fn env_or(key: &str, fallback: &str) -> String {
    env::var(key).unwrap_or_else(|_| fallback.to_string())
}
