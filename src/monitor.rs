//! Monitor loop: sleep, scan, decide, repeat.
//!
//! The loop owns the cutoff timestamp, the only mutable state in the
//! system. Each iteration sleeps for the configured interval, scans the
//! watched tree for files created since the cutoff, and either logs the
//! findings or, when nothing new appeared, asks the [`Notifier`] to alert
//! an operator. The cutoff then advances to the post-scan clock reading,
//! so it is monotonically non-decreasing and no file is reported twice.
//!
//! Scan and notification failures are fatal and propagate out of
//! [`Monitor::run`]; the process is expected to be restarted externally.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tokio::time::sleep;
use tracing::info;

use crate::error::Result;
use crate::notifier::Notifier;
use crate::scanner;

/// Drives scan iterations on a fixed cadence.
pub struct Monitor<N: Notifier> {
    root_dir: PathBuf,
    interval_minutes: u64,
    interval: Duration,
    notifier: N,
    cutoff: SystemTime,
}

impl<N: Notifier> Monitor<N> {
    /// Creates a monitor for `root_dir`, checking every `interval_minutes`.
    ///
    /// The cutoff starts at the current time, so only files created after
    /// construction are ever reported.
    pub fn new(root_dir: PathBuf, interval_minutes: u64, notifier: N) -> Self {
        Self {
            root_dir,
            interval_minutes,
            interval: Duration::from_secs(interval_minutes * 60),
            notifier,
            cutoff: SystemTime::now(),
        }
    }

    /// Runs the sleep-scan-decide cycle until `shutdown` completes.
    ///
    /// Nothing else is serviced during the sleep; the shutdown future is
    /// only observed between iterations and while sleeping, not mid-scan.
    ///
    /// # Errors
    ///
    /// Returns the first scan or notification error; no iteration is
    /// skipped or retried.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        info!(
            root_dir = %self.root_dir.display(),
            interval_minutes = self.interval_minutes,
            "Monitor started"
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping monitor");
                    return Ok(());
                }
                _ = sleep(self.interval) => {
                    self.tick().await?;
                }
            }
        }
    }

    /// Performs one scanning/deciding pass.
    ///
    /// New files are logged and suppress the notification; an empty scan
    /// notifies the operator. Either way the cutoff advances to the clock
    /// reading captured right after the scan.
    pub async fn tick(&mut self) -> Result<()> {
        let new_files = scanner::scan(&self.root_dir, self.cutoff)?;
        let now = SystemTime::now();

        if new_files.is_empty() {
            let message = format!(
                "No new files were created in the last {} minutes",
                self.interval_minutes
            );
            self.notifier.send(&message).await?;
            info!("New files check, no new files were created");
        } else {
            info!(
                new_files = %serde_json::to_string(&new_files)?,
                "New files check, new files were created"
            );
        }

        self.cutoff = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SentinelError;
    use crate::notifier::NotifyError;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::thread;

    /// See scanner::tests: keeps file creation and cutoff capture apart.
    const CLOCK_MARGIN: Duration = Duration::from_millis(50);

    #[derive(Clone, Default)]
    struct MockNotifier {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl MockNotifier {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().expect("lock").clone()
        }
    }

    impl Notifier for MockNotifier {
        async fn send(&self, message: &str) -> std::result::Result<(), NotifyError> {
            self.messages.lock().expect("lock").push(message.to_string());
            Ok(())
        }
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        async fn send(&self, _message: &str) -> std::result::Result<(), NotifyError> {
            Err(NotifyError::LogFile {
                path: PathBuf::from("/var/log/sentinel.log"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        }
    }

    fn touch(dir: &Path, name: &str) {
        let mut file = File::create(dir.join(name)).expect("create file");
        file.write_all(b"payload").expect("write file");
    }

    #[tokio::test]
    async fn empty_scan_notifies_with_interval_in_message() {
        let dir = tempfile::tempdir().expect("tempdir");
        let notifier = MockNotifier::default();
        let mut monitor = Monitor::new(dir.path().to_path_buf(), 15, notifier.clone());

        monitor.tick().await.expect("tick");

        assert_eq!(
            notifier.messages(),
            vec!["No new files were created in the last 15 minutes".to_string()]
        );
    }

    #[tokio::test]
    async fn new_files_suppress_the_notification() {
        let dir = tempfile::tempdir().expect("tempdir");
        let notifier = MockNotifier::default();
        let mut monitor = Monitor::new(dir.path().to_path_buf(), 15, notifier.clone());

        thread::sleep(CLOCK_MARGIN);
        touch(dir.path(), "a.txt");
        touch(dir.path(), "b.txt");
        touch(dir.path(), "c.txt");

        monitor.tick().await.expect("tick");

        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn second_tick_does_not_rereport_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let notifier = MockNotifier::default();
        let mut monitor = Monitor::new(dir.path().to_path_buf(), 5, notifier.clone());

        thread::sleep(CLOCK_MARGIN);
        touch(dir.path(), "once.txt");

        monitor.tick().await.expect("first tick");
        assert!(notifier.messages().is_empty(), "first tick found the file");

        // No filesystem changes since: the file must not be reported again,
        // so the empty branch fires.
        thread::sleep(CLOCK_MARGIN);
        monitor.tick().await.expect("second tick");
        assert_eq!(
            notifier.messages(),
            vec!["No new files were created in the last 5 minutes".to_string()]
        );
    }

    #[tokio::test]
    async fn scan_failure_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("gone");
        let mut monitor = Monitor::new(missing, 15, MockNotifier::default());

        let err = monitor.tick().await.unwrap_err();
        assert!(matches!(err, SentinelError::Scan(_)));
    }

    #[tokio::test]
    async fn notification_failure_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut monitor = Monitor::new(dir.path().to_path_buf(), 15, FailingNotifier);

        let err = monitor.tick().await.unwrap_err();
        assert!(matches!(err, SentinelError::Notify(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn run_iterates_on_the_interval_until_shutdown() {
        let dir = tempfile::tempdir().expect("tempdir");
        let notifier = MockNotifier::default();
        let monitor = Monitor::new(dir.path().to_path_buf(), 1, notifier.clone());

        // One sleep completes at t=60s, the next would end at t=120s, so a
        // shutdown at t=90s allows exactly one iteration.
        monitor
            .run(sleep(Duration::from_secs(90)))
            .await
            .expect("run");

        assert_eq!(
            notifier.messages(),
            vec!["No new files were created in the last 1 minutes".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_before_first_interval_scans_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let notifier = MockNotifier::default();
        let monitor = Monitor::new(dir.path().to_path_buf(), 1, notifier.clone());

        monitor
            .run(sleep(Duration::from_secs(30)))
            .await
            .expect("run");

        assert!(notifier.messages().is_empty());
    }
}
