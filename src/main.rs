//! File Sentinel daemon entry point.
//!
//! Takes no CLI arguments: configuration is read from `config.json` in the
//! current working directory, synthesized with defaults on first run. All
//! operational output goes to the configured log file.
//!
//! # Environment Variables
//!
//! Used only when synthesizing a default configuration:
//!
//! - `LOGGER_EMAIL_RECEIVER`: notification recipient address
//! - `LOGGER_EMAIL_SENDER`: notification sender address
//! - `LOGGER_EMAIL_PASSWORD`: credential for the sending transport
//!
//! `RUST_LOG` adjusts the log filter as usual.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use file_sentinel::config::{Config, DEFAULT_CONFIG_FILE};
use file_sentinel::logging;
use file_sentinel::monitor::Monitor;
use file_sentinel::notifier::{EmailNotifier, Notifier, WebhookNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_create(Path::new(DEFAULT_CONFIG_FILE))
        .context("Failed to load configuration")?;

    logging::init(&config.log_file_location).with_context(|| {
        format!(
            "Failed to open log file {}",
            config.log_file_location.display()
        )
    })?;

    // The credential is deliberately left out of the log, which gets
    // attached to outgoing notifications.
    info!(
        directory_of_interest = %config.directory_of_interest.display(),
        check_time_interval = config.check_time_interval,
        log_file_location = %config.log_file_location.display(),
        email_receiver = %config.email_receiver,
        email_sender = %config.email_sender,
        "Configuration loaded"
    );

    match config.webhook_url.clone() {
        Some(url) => {
            let notifier = WebhookNotifier::new(url, config.log_file_location.clone());
            run_sentinel(&config, notifier).await
        }
        None => {
            let notifier = EmailNotifier::new(
                config.log_file_location.clone(),
                config.email_receiver.clone(),
                config.email_sender.clone(),
                config.email_password.clone(),
            )
            .context("Failed to configure SMTP transport")?;
            run_sentinel(&config, notifier).await
        }
    }
}

/// Runs the monitor loop until a shutdown signal arrives or an iteration
/// fails.
async fn run_sentinel<N: Notifier>(config: &Config, notifier: N) -> Result<()> {
    let monitor = Monitor::new(
        config.directory_of_interest.clone(),
        config.check_time_interval,
        notifier,
    );

    monitor
        .run(wait_for_shutdown())
        .await
        .context("Monitor loop failed")?;

    info!("Sentinel stopped");
    Ok(())
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
