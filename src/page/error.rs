//! Errors raised by page interactions.

use std::time::Duration;

use crate::retry::ConfigurationError;

/// Failure of a single page interaction.
///
/// Driver implementations report their failures through these variants; the
/// retry executor passes the last one through to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// Navigation to `url` failed.
    Navigation {
        /// The location that could not be loaded.
        url: String,
        /// Driver-supplied reason.
        reason: String,
    },
    /// Waiting for `selector` exceeded `timeout`.
    Timeout {
        /// The selector being waited on.
        selector: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },
    /// No element matched `selector`.
    ElementNotFound {
        /// The selector that matched nothing.
        selector: String,
    },
    /// The element matched by `selector` never became visible.
    NotVisible {
        /// The selector being asserted on.
        selector: String,
    },
    /// The element matched by `selector` did not contain `expected`.
    TextMismatch {
        /// The selector being asserted on.
        selector: String,
        /// The text that was expected.
        expected: String,
    },
    /// The page or browser has already been closed.
    Closed,
    /// Any other driver failure.
    Driver(String),
    /// A retry policy was misconfigured.
    Configuration(ConfigurationError),
}

impl PageError {
    /// Create a driver error from any message.
    pub fn driver(msg: impl Into<String>) -> Self {
        PageError::Driver(msg.into())
    }

    /// The selector this error refers to, if any.
    pub fn selector(&self) -> Option<&str> {
        match self {
            PageError::Timeout { selector, .. }
            | PageError::ElementNotFound { selector }
            | PageError::NotVisible { selector }
            | PageError::TextMismatch { selector, .. } => Some(selector),
            _ => None,
        }
    }
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageError::Navigation { url, reason } => {
                write!(f, "navigation to {} failed: {}", url, reason)
            }
            PageError::Timeout { selector, timeout } => {
                write!(f, "timed out after {:?} waiting for [{}]", timeout, selector)
            }
            PageError::ElementNotFound { selector } => write!(f, "no element matches [{}]", selector),
            PageError::NotVisible { selector } => write!(f, "element [{}] is not visible", selector),
            PageError::TextMismatch { selector, expected } => {
                write!(f, "element [{}] does not contain \"{}\"", selector, expected)
            }
            PageError::Closed => write!(f, "page has been closed"),
            PageError::Driver(msg) => write!(f, "driver error: {}", msg),
            PageError::Configuration(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PageError::Configuration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigurationError> for PageError {
    fn from(e: ConfigurationError) -> Self {
        PageError::Configuration(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_selector() {
        let err = PageError::NotVisible {
            selector: "h1".to_string(),
        };
        assert_eq!(err.to_string(), "element [h1] is not visible");
        assert_eq!(err.selector(), Some("h1"));
    }

    #[test]
    fn test_configuration_error_is_source() {
        use std::error::Error;

        let err = PageError::from(ConfigurationError::new(0));
        assert!(err.source().is_some());
        assert_eq!(err.selector(), None);
    }

    #[test]
    fn test_timeout_display() {
        let err = PageError::Timeout {
            selector: "#productTitle".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("30s"));
        assert!(err.to_string().contains("#productTitle"));
    }
}
