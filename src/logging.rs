//! Tracing subscriber setup for test runs.
//!
//! Events go to three sinks:
//! - the console, human-readable with colors
//! - `combined.log` in the log directory, every event that passes the filter
//! - `error.log` in the log directory, error events only
//!
//! File writers are non-blocking; keep the returned [`LogGuards`] alive for
//! the whole run or buffered lines are lost.
//!
//! ```rust,ignore
//! use steadfast::config::Settings;
//! use steadfast::logging::{init_logging, LogConfig};
//!
//! let settings = Settings::from_env()?;
//! let _guards = init_logging(&LogConfig::from_settings(&settings))?;
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::Settings;

/// File receiving every event.
pub const COMBINED_LOG: &str = "combined.log";

/// File receiving error events.
pub const ERROR_LOG: &str = "error.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn timer() -> ChronoLocal {
    ChronoLocal::new(TIMESTAMP_FORMAT.to_string())
}

/// Error raised while installing the subscriber.
#[derive(Debug)]
pub enum LoggingError {
    /// The log directory could not be created.
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The level directive could not be parsed.
    InvalidFilter(String),
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::CreateDir { path, source } => {
                write!(f, "cannot create log directory {}: {}", path.display(), source)
            }
            LoggingError::InvalidFilter(msg) => write!(f, "invalid log level: {}", msg),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::CreateDir { source, .. } => Some(source),
            LoggingError::InvalidFilter(_) => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `steadfast=debug,warn`.
    pub level: String,
    /// Directory for the log files.
    pub dir: PathBuf,
    /// Also log to the console.
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: PathBuf::from("logs"),
            console: true,
        }
    }
}

impl LogConfig {
    /// Level and directory from [`Settings`].
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            level: settings.log_level.clone(),
            dir: settings.log_dir.clone(),
            console: true,
        }
    }

    /// Disable console output.
    pub fn without_console(mut self) -> Self {
        self.console = false;
        self
    }
}

/// Flush guards for the file writers.
#[derive(Debug)]
pub struct LogGuards {
    _combined: WorkerGuard,
    _errors: WorkerGuard,
}

/// Install the global subscriber.
///
/// If a global subscriber is already installed it is left in place and the
/// call still succeeds.
pub fn init_logging(config: &LogConfig) -> Result<LogGuards, LoggingError> {
    std::fs::create_dir_all(&config.dir).map_err(|source| LoggingError::CreateDir {
        path: config.dir.clone(),
        source,
    })?;

    let filter =
        EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;

    let (combined_writer, combined_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&config.dir, COMBINED_LOG));
    let (error_writer, error_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&config.dir, ERROR_LOG));

    let console = config
        .console
        .then(|| fmt::layer().with_target(false).with_timer(timer()));

    let init_result = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer())
                .with_writer(combined_writer),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer())
                .with_writer(error_writer)
                .with_filter(LevelFilter::ERROR),
        )
        .try_init();

    if let Err(e) = init_result {
        tracing::debug!(error = %e, "global subscriber already installed");
    }

    Ok(LogGuards {
        _combined: combined_guard,
        _errors: error_guard,
    })
}

/// Install the subscriber configured by [`Settings`].
pub fn init_from_settings(settings: &Settings) -> Result<LogGuards, LoggingError> {
    init_logging(&LogConfig::from_settings(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            level: "steadfast=loud".to_string(),
            dir: dir.path().to_path_buf(),
            console: false,
        };
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings::from_lookup(|key| match key {
            "LOG_LEVEL" => Some("debug".to_string()),
            "LOG_DIR" => Some("target/test-logs".to_string()),
            _ => None,
        })
        .unwrap();
        let config = LogConfig::from_settings(&settings).without_console();
        assert_eq!(config.level, "debug");
        assert_eq!(config.dir, PathBuf::from("target/test-logs"));
        assert!(!config.console);
    }
}
