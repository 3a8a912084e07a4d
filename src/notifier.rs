//! Notification delivery.
//!
//! The monitor loop talks to a [`Notifier`], which delivers an operator
//! message together with the current log file. Two backends are provided:
//!
//! - [`EmailNotifier`]: SMTP submission over STARTTLS with the log file as
//!   a base64-encoded attachment.
//! - [`WebhookNotifier`]: HTTP POST with the log content base64-encoded
//!   into the JSON body.
//!
//! Delivery is awaited inline by the loop with no retry or timeout
//! wrapping, so a hung transport stalls the next scan iteration.

use std::future::Future;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

/// Mail submission host for the email backend.
const SMTP_RELAY: &str = "smtp.gmail.com";

/// Subject line of every notification email.
const EMAIL_SUBJECT: &str = "Log File Notification";

/// Attachment name used when the log path has no file name component.
const FALLBACK_ATTACHMENT_NAME: &str = "sentinel.log";

/// Errors that can occur while delivering a notification.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// A configured sender or receiver address is not a valid mailbox.
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The email message could not be assembled.
    #[error("failed to build email message: {0}")]
    Message(#[from] lettre::error::Error),

    /// The attachment content type is invalid.
    #[error("invalid attachment content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),

    /// The SMTP transport failed or refused the submission.
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The log file to attach could not be read.
    #[error("failed to read log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The webhook request failed or returned a non-success status.
    #[error("webhook error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Capability for delivering a message, with the current log file, to an
/// operator.
///
/// The monitor loop is generic over this trait so backends can be swapped
/// without touching the loop itself.
pub trait Notifier {
    /// Delivers `message` together with the current log file.
    fn send(&self, message: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Email backend: sends the message with the log file attached, over a
/// STARTTLS-upgraded connection to the mail submission endpoint.
pub struct EmailNotifier {
    log_file_location: PathBuf,
    receiver: String,
    sender: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    /// Creates an email notifier authenticating as `sender` with
    /// `password`.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] if the transport cannot be configured.
    pub fn new(
        log_file_location: PathBuf,
        receiver: String,
        sender: String,
        password: String,
    ) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(SMTP_RELAY)?
            .credentials(Credentials::new(sender.clone(), password))
            .build();

        Ok(Self {
            log_file_location,
            receiver,
            sender,
            transport,
        })
    }

    /// Assembles the multipart message: plain-text body plus the log file
    /// as a binary attachment named after its file name.
    fn build_message(&self, body: &str, attachment: Vec<u8>) -> Result<Message, NotifyError> {
        let from: Mailbox = self.sender.parse()?;
        let to: Mailbox = self.receiver.parse()?;

        let attachment_part = Attachment::new(attachment_name(&self.log_file_location))
            .body(attachment, ContentType::parse("application/octet-stream")?);

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(EMAIL_SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(body.to_string()))
                    .singlepart(attachment_part),
            )?;

        Ok(message)
    }
}

impl Notifier for EmailNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let attachment =
            tokio::fs::read(&self.log_file_location)
                .await
                .map_err(|source| NotifyError::LogFile {
                    path: self.log_file_location.clone(),
                    source,
                })?;

        let email = self.build_message(message, attachment)?;

        debug!(receiver = %self.receiver, "Submitting notification email");
        self.transport.send(email).await?;
        info!(receiver = %self.receiver, "Notification email sent");

        Ok(())
    }
}

/// Webhook backend: POSTs the message and base64-encoded log content as
/// JSON to a configured endpoint.
pub struct WebhookNotifier {
    url: String,
    log_file_location: PathBuf,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Creates a webhook notifier targeting `url`.
    pub fn new(url: String, log_file_location: PathBuf) -> Self {
        Self {
            url,
            log_file_location,
            client: reqwest::Client::new(),
        }
    }
}

impl Notifier for WebhookNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let log_content =
            tokio::fs::read(&self.log_file_location)
                .await
                .map_err(|source| NotifyError::LogFile {
                    path: self.log_file_location.clone(),
                    source,
                })?;

        let payload = json!({
            "message": message,
            "log_file": attachment_name(&self.log_file_location),
            "log_content": BASE64.encode(log_content),
        });

        debug!(url = %self.url, "Posting notification webhook");
        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        info!(url = %self.url, "Notification webhook delivered");

        Ok(())
    }
}

fn attachment_name(log_file: &Path) -> String {
    log_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_ATTACHMENT_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_email_notifier(log_file: PathBuf) -> EmailNotifier {
        EmailNotifier::new(
            log_file,
            "ops@example.com".to_string(),
            "sentinel@example.com".to_string(),
            "password".to_string(),
        )
        .expect("transport should configure")
    }

    #[tokio::test]
    async fn email_message_carries_subject_body_and_attachment() {
        let notifier = test_email_notifier(PathBuf::from("/var/log/sentinel.log"));

        let message = notifier
            .build_message("No new files were created in the last 15 minutes", b"log line".to_vec())
            .expect("message should build");

        let rendered = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(rendered.contains("Subject: Log File Notification"));
        assert!(rendered.contains("No new files were created in the last 15 minutes"));
        assert!(rendered.contains("attachment; filename=\"sentinel.log\""));
    }

    #[tokio::test]
    async fn invalid_sender_address_is_rejected() {
        let notifier = EmailNotifier::new(
            PathBuf::from("/var/log/sentinel.log"),
            "ops@example.com".to_string(),
            "not an address".to_string(),
            "password".to_string(),
        )
        .expect("transport should configure");

        let err = notifier.build_message("hello", Vec::new()).unwrap_err();
        assert!(matches!(err, NotifyError::Address(_)));
    }

    #[test]
    fn attachment_name_falls_back_when_path_has_no_file_name() {
        assert_eq!(attachment_name(Path::new("/")), FALLBACK_ATTACHMENT_NAME);
        assert_eq!(attachment_name(Path::new("/var/log/monitor.txt")), "monitor.txt");
    }

    #[tokio::test]
    async fn webhook_posts_message_and_encoded_log() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notify"))
            .and(body_partial_json(json!({
                "message": "no new files",
                "log_file": "sentinel.log",
                "log_content": BASE64.encode(b"log line"),
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let log_file = dir.path().join("sentinel.log");
        std::fs::write(&log_file, b"log line").expect("write log");

        let notifier = WebhookNotifier::new(format!("{}/notify", server.uri()), log_file);
        notifier.send("no new files").await.expect("send");
    }

    #[tokio::test]
    async fn webhook_error_status_is_a_send_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let log_file = dir.path().join("sentinel.log");
        std::fs::write(&log_file, b"log line").expect("write log");

        let notifier = WebhookNotifier::new(server.uri(), log_file);
        let err = notifier.send("no new files").await.unwrap_err();
        assert!(matches!(err, NotifyError::Http(_)));
    }

    #[tokio::test]
    async fn missing_log_file_is_a_send_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let notifier = WebhookNotifier::new(
            "http://localhost:9".to_string(),
            dir.path().join("gone.log"),
        );

        let err = notifier.send("no new files").await.unwrap_err();
        assert!(matches!(err, NotifyError::LogFile { .. }));
    }
}
