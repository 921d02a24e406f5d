//! E-mailing the test report.
//!
//! The report e-mail is composed here and handed to a [`ReportTransport`].
//! Delivery problems never fail the run: [`send_report`] logs them and
//! returns `None`.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::Settings;

/// Default subject line for report e-mails.
pub const DEFAULT_SUBJECT: &str = "Automated Test Report";

/// SMTP account settings, read from `EMAIL_*` variables.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailSettings {
    /// SMTP host (`EMAIL_HOST`); `None` means no real server is configured.
    pub host: Option<String>,
    /// SMTP port (`EMAIL_PORT`).
    pub port: u16,
    /// Use implicit TLS (`EMAIL_SECURE`).
    pub secure: bool,
    /// Account user (`EMAIL_USER`).
    pub user: Option<String>,
    /// Account password (`EMAIL_PASS`).
    pub password: Option<String>,
    /// Sender address (`EMAIL_FROM`, falling back to the user).
    pub from: Option<String>,
}

impl std::fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .finish()
    }
}

impl EmailSettings {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings from a dotenv-format file.
    ///
    /// Variables already set in the process environment take precedence,
    /// matching how [`EmailSettings::from_env`] loads `.env`.
    pub fn from_env_file(path: &Path) -> Result<Self, dotenvy::Error> {
        let file: HashMap<String, String> =
            dotenvy::from_path_iter(path)?.collect::<Result<_, _>>()?;
        Ok(Self::from_lookup(|key| {
            std::env::var(key).ok().or_else(|| file.get(key).cloned())
        }))
    }

    /// Read settings through an arbitrary variable lookup.
    ///
    /// An unparsable port falls back to 587.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = lookup("EMAIL_USER");
        Self {
            host: lookup("EMAIL_HOST").filter(|h| !h.is_empty()),
            port: lookup("EMAIL_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(587),
            secure: lookup("EMAIL_SECURE").as_deref() == Some("true"),
            from: lookup("EMAIL_FROM").or_else(|| user.clone()),
            password: lookup("EMAIL_PASS"),
            user,
        }
    }

    /// Whether a real SMTP host is configured.
    pub fn is_configured(&self) -> bool {
        self.host.is_some()
    }
}

/// What to send and to whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Subject line.
    pub subject: String,
    /// Recipient list, as given.
    pub to: String,
    /// HTML report to inline as the body, if it exists.
    pub html_path: Option<PathBuf>,
    /// Plain-text body used when no HTML report is available.
    pub text: Option<String>,
}

impl ReportOptions {
    /// Options for sending the suite's HTML report to `EMAIL_TO`.
    pub fn from_settings<F>(settings: &Settings, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            to: lookup("EMAIL_TO").unwrap_or_default(),
            html_path: Some(settings.report_index()),
            text: None,
        }
    }
}

/// Body of a report e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportBody {
    /// Inlined HTML report.
    Html(String),
    /// Plain text.
    Text(String),
    /// Nothing to send beyond the subject.
    Empty,
}

/// A composed report e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEmail {
    /// Sender address.
    pub from: Option<String>,
    /// Recipients.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: ReportBody,
    /// When the e-mail was composed, see [`report_timestamp`].
    pub generated_at: String,
}

impl ReportEmail {
    /// Compose an e-mail from `options`.
    ///
    /// The HTML report wins when its file can be read; otherwise the text
    /// body is used, otherwise the body is empty.
    pub async fn compose(options: &ReportOptions, settings: &EmailSettings) -> Self {
        let html = match &options.html_path {
            Some(path) => match tokio::fs::read_to_string(path).await {
                Ok(html) => Some(html),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "report file not readable");
                    None
                }
            },
            None => None,
        };

        let body = match (html, &options.text) {
            (Some(html), _) => ReportBody::Html(html),
            (None, Some(text)) => ReportBody::Text(text.clone()),
            (None, None) => ReportBody::Empty,
        };

        Self {
            from: settings.from.clone(),
            to: options.to.clone(),
            subject: options.subject.clone(),
            body,
            generated_at: report_timestamp(Utc::now()),
        }
    }
}

/// Error from a [`ReportTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError(pub String);

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "report delivery failed: {}", self.0)
    }
}

impl std::error::Error for DeliveryError {}

/// Something that can deliver a report e-mail.
pub trait ReportTransport: Send + Sync {
    /// Deliver `email`, returning the message id.
    fn send(&self, email: &ReportEmail)
        -> impl Future<Output = Result<String, DeliveryError>> + Send;
}

/// A transport that only logs what it would send.
///
/// Used when no SMTP host is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunTransport;

impl ReportTransport for DryRunTransport {
    async fn send(&self, email: &ReportEmail) -> Result<String, DeliveryError> {
        let id = format!("<dry-run-{}@steadfast>", email.generated_at);
        tracing::info!(to = %email.to, subject = %email.subject, message_id = %id, "dry run: report not delivered");
        Ok(id)
    }
}

/// Compose and send the report.
///
/// Returns the message id, or `None` if delivery failed. Failures are
/// logged, never raised.
pub async fn send_report<T: ReportTransport>(
    transport: &T,
    options: &ReportOptions,
    settings: &EmailSettings,
) -> Option<String> {
    let email = ReportEmail::compose(options, settings).await;
    match transport.send(&email).await {
        Ok(id) => {
            tracing::info!(message_id = %id, "email sent");
            Some(id)
        }
        Err(error) => {
            tracing::error!(%error, "failed to send email");
            None
        }
    }
}

/// ISO-8601 UTC timestamp safe for file names: `:` and `.` become `-`.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use steadfast::report::report_timestamp;
///
/// let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
/// assert_eq!(report_timestamp(at), "2025-03-09T14-05-07-000Z");
/// ```
pub fn report_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<ReportEmail>>,
        fail: bool,
    }

    impl ReportTransport for Recording {
        async fn send(&self, email: &ReportEmail) -> Result<String, DeliveryError> {
            if self.fail {
                return Err(DeliveryError("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok("<1@test>".to_string())
        }
    }

    fn options(html_path: Option<PathBuf>, text: Option<&str>) -> ReportOptions {
        ReportOptions {
            subject: DEFAULT_SUBJECT.to_string(),
            to: "qa@example.com".to_string(),
            html_path,
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_email_settings_defaults_and_fallbacks() {
        let s = EmailSettings::from_lookup(|key| match key {
            "EMAIL_USER" => Some("bot@example.com".to_string()),
            "EMAIL_PORT" => Some("not-a-port".to_string()),
            _ => None,
        });
        assert_eq!(s.port, 587);
        assert!(!s.secure);
        assert_eq!(s.from.as_deref(), Some("bot@example.com"));
        assert!(!s.is_configured());
    }

    #[test]
    fn test_env_file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "STEADFAST_UNUSED=1\nEMAIL_PORT=2525\nEMAIL_SECURE=true\n",
        )
        .unwrap();

        let s = EmailSettings::from_env_file(&path).unwrap();
        assert_eq!(s.port, 2525);
        assert!(s.secure);
    }

    #[test]
    fn test_missing_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EmailSettings::from_env_file(&dir.path().join(".env")).is_err());
    }

    #[test]
    fn test_password_is_redacted() {
        let s = EmailSettings::from_lookup(|key| match key {
            "EMAIL_PASS" => Some("hunter2".to_string()),
            _ => None,
        });
        let debug = format!("{:?}", s);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_html_report_is_inlined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "<h1>3 passed</h1>").unwrap();

        let email = ReportEmail::compose(
            &options(Some(path), Some("fallback")),
            &EmailSettings::from_lookup(|_| None),
        )
        .await;

        assert_eq!(email.body, ReportBody::Html("<h1>3 passed</h1>".to_string()));
    }

    #[tokio::test]
    async fn test_missing_report_falls_back_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let email = ReportEmail::compose(
            &options(Some(dir.path().join("absent.html")), Some("see CI")),
            &EmailSettings::from_lookup(|_| None),
        )
        .await;
        assert_eq!(email.body, ReportBody::Text("see CI".to_string()));

        let email =
            ReportEmail::compose(&options(None, None), &EmailSettings::from_lookup(|_| None)).await;
        assert_eq!(email.body, ReportBody::Empty);
    }

    #[tokio::test]
    async fn test_send_report_returns_message_id() {
        let transport = Recording::default();
        let settings = EmailSettings::from_lookup(|key| match key {
            "EMAIL_FROM" => Some("reports@example.com".to_string()),
            _ => None,
        });

        let id = send_report(&transport, &options(None, Some("ok")), &settings).await;

        assert_eq!(id.as_deref(), Some("<1@test>"));
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from.as_deref(), Some("reports@example.com"));
        assert_eq!(sent[0].to, "qa@example.com");
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let transport = Recording {
            fail: true,
            ..Default::default()
        };
        let id = send_report(
            &transport,
            &options(None, None),
            &EmailSettings::from_lookup(|_| None),
        )
        .await;
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn test_dry_run_transport() {
        let id = send_report(
            &DryRunTransport,
            &options(None, Some("text")),
            &EmailSettings::from_lookup(|_| None),
        )
        .await;
        assert!(id.unwrap().starts_with("<dry-run-"));
    }

    #[test]
    fn test_options_from_settings() {
        let settings = Settings::from_lookup(|key| match key {
            "REPORT_DIR" => Some("reports".to_string()),
            _ => None,
        })
        .unwrap();
        let opts = ReportOptions::from_settings(&settings, |key| match key {
            "EMAIL_TO" => Some("team@example.com".to_string()),
            _ => None,
        });
        assert_eq!(opts.to, "team@example.com");
        assert_eq!(opts.html_path, Some(PathBuf::from("reports").join("index.html")));
    }
}
