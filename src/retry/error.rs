//! Error types for retry operations.

/// Error returned when a retry policy is built with an unusable attempt limit.
///
/// This is raised before any attempt runs and is never retried.
///
/// # Examples
///
/// ```rust
/// use steadfast::retry::{ConfigurationError, DelayPolicy, RetryPolicy};
///
/// let err = RetryPolicy::new(0, DelayPolicy::None).unwrap_err();
/// assert_eq!(err, ConfigurationError::new(0));
/// assert!(err.to_string().contains("at least 1"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationError {
    attempt_limit: u32,
}

impl ConfigurationError {
    /// Create a configuration error for the rejected limit.
    pub fn new(attempt_limit: u32) -> Self {
        Self { attempt_limit }
    }

    /// The attempt limit that was rejected.
    pub fn attempt_limit(&self) -> u32 {
        self.attempt_limit
    }
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "attempt limit must be at least 1, got {}",
            self.attempt_limit
        )
    }
}

impl std::error::Error for ConfigurationError {}
