//! Retry policy types and configuration.

use std::time::Duration;

use super::error::ConfigurationError;

/// A retry policy describing how to retry one fallible operation.
///
/// Policies are pure data - they describe retry behavior but don't execute it.
/// This makes them easy to test, clone, and inspect. A policy always allows
/// at least one attempt; [`RetryPolicy::new`] rejects a zero limit.
///
/// # Examples
///
/// ```rust
/// use steadfast::retry::{DelayPolicy, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, DelayPolicy::linear(Duration::from_millis(1000))).unwrap();
///
/// assert_eq!(policy.attempt_limit(), 3);
/// assert_eq!(policy.delay_after(1), Some(Duration::from_millis(1000)));
/// assert_eq!(policy.delay_after(2), Some(Duration::from_millis(2000)));
/// assert_eq!(policy.delay_after(3), None); // no pause after the final attempt
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    attempt_limit: u32,
    delay: DelayPolicy,
    jitter: JitterStrategy,
}

/// How long to pause after a failed attempt, as a function of its 1-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelayPolicy {
    /// Retry immediately.
    None,
    /// Fixed delay between attempts.
    Constant(Duration),
    /// Delay increases linearly: base * attempt.
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay doubles: base * 2^(attempt - 1).
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
}

/// Strategy for adding randomness to delays.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to delay.
    Proportional(f64),
}

/// The kinds of page interaction that run under a retry policy.
///
/// Every kind uses the same executor; they differ only in their default
/// limits and delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Navigate to a location.
    Navigate,
    /// Set the value of an input field.
    SetInput,
    /// Click an element.
    Click,
    /// Read the text content of an element.
    ReadText,
    /// Wait for an element to be present.
    WaitForElement,
}

/// Information about a failed attempt, passed to hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The attempt limit of the running policy.
    pub attempt_limit: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before next attempt, `None` when this was the final attempt.
    pub next_delay: Option<Duration>,
}

impl DelayPolicy {
    /// Fixed delay between attempts.
    pub fn constant(delay: Duration) -> Self {
        DelayPolicy::Constant(delay)
    }

    /// Linearly increasing delay.
    ///
    /// ```rust
    /// use steadfast::retry::DelayPolicy;
    /// use std::time::Duration;
    ///
    /// let delay = DelayPolicy::linear(Duration::from_millis(100));
    /// assert_eq!(delay.for_attempt(1), Duration::from_millis(100));
    /// assert_eq!(delay.for_attempt(3), Duration::from_millis(300));
    /// ```
    pub fn linear(base: Duration) -> Self {
        DelayPolicy::Linear { base }
    }

    /// Exponentially increasing delay.
    pub fn exponential(base: Duration) -> Self {
        DelayPolicy::Exponential { base }
    }

    /// Delay after the given failed attempt (1-indexed).
    pub fn for_attempt(&self, attempt: u32) -> Duration {
        match self {
            DelayPolicy::None => Duration::ZERO,
            DelayPolicy::Constant(d) => *d,
            DelayPolicy::Linear { base } => base.saturating_mul(attempt),
            DelayPolicy::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
            }
        }
    }
}

impl RetryPolicy {
    /// Create a policy, rejecting an attempt limit below 1.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::retry::{DelayPolicy, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// assert!(RetryPolicy::new(2, DelayPolicy::constant(Duration::from_millis(500))).is_ok());
    /// assert!(RetryPolicy::new(0, DelayPolicy::None).is_err());
    /// ```
    pub fn new(attempt_limit: u32, delay: DelayPolicy) -> Result<Self, ConfigurationError> {
        if attempt_limit < 1 {
            return Err(ConfigurationError::new(attempt_limit));
        }
        Ok(Self {
            attempt_limit,
            delay,
            jitter: JitterStrategy::None,
        })
    }

    /// Change the attempt limit, keeping the delay policy.
    pub fn with_attempt_limit(self, attempt_limit: u32) -> Result<Self, ConfigurationError> {
        if attempt_limit < 1 {
            return Err(ConfigurationError::new(attempt_limit));
        }
        Ok(Self {
            attempt_limit,
            ..self
        })
    }

    /// Add proportional jitter to delays.
    ///
    /// The factor determines the range of randomness. For example, `0.25` means
    /// the actual delay will be ±25% of the calculated delay.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 };
        self.jitter = JitterStrategy::Proportional(factor);
        self
    }

    /// Maximum number of attempts, including the first.
    pub fn attempt_limit(&self) -> u32 {
        self.attempt_limit
    }

    /// Get the delay policy.
    pub fn delay(&self) -> &DelayPolicy {
        &self.delay
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Delay to apply after the given failed attempt (1-indexed).
    ///
    /// Returns `None` once the attempt limit is reached.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.attempt_limit {
            return None;
        }
        Some(self.delay.for_attempt(attempt))
    }

    /// Calculate the delay with jitter applied.
    ///
    /// This is used internally by the retry executor.
    #[doc(hidden)]
    pub fn delay_with_jitter(&self, attempt: u32) -> Option<Duration> {
        let base_delay = self.delay_after(attempt)?;
        Some(self.jitter.apply(base_delay))
    }
}

impl JitterStrategy {
    /// Apply jitter to a base delay.
    pub fn apply(&self, base_delay: Duration) -> Duration {
        match self {
            JitterStrategy::None => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let base_millis = base_delay.as_millis() as f64;
                let jitter_range = base_millis * factor;
                let min = (base_millis - jitter_range).max(0.0);
                let max = base_millis + jitter_range;
                if !jitter_range.is_finite() || max <= min {
                    return base_delay;
                }
                let jittered_millis = rand::rng().random_range(min..=max);
                Duration::from_millis(jittered_millis as u64)
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) => base_delay,
        }
    }
}

impl OperationKind {
    /// All operation kinds, in declaration order.
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Navigate,
        OperationKind::SetInput,
        OperationKind::Click,
        OperationKind::ReadText,
        OperationKind::WaitForElement,
    ];

    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Navigate => "navigate",
            OperationKind::SetInput => "set_input",
            OperationKind::Click => "click",
            OperationKind::ReadText => "read_text",
            OperationKind::WaitForElement => "wait_for_element",
        }
    }

    /// Default attempt limit for this kind.
    pub fn default_attempt_limit(&self) -> u32 {
        match self {
            OperationKind::Navigate => 3,
            _ => 2,
        }
    }

    /// Default delay policy for this kind.
    pub fn default_delay(&self) -> DelayPolicy {
        match self {
            OperationKind::Navigate => DelayPolicy::linear(Duration::from_millis(1000)),
            OperationKind::SetInput | OperationKind::Click | OperationKind::ReadText => {
                DelayPolicy::constant(Duration::from_millis(500))
            }
            OperationKind::WaitForElement => DelayPolicy::None,
        }
    }

    /// The default policy for this kind.
    ///
    /// ```rust
    /// use steadfast::retry::OperationKind;
    /// use std::time::Duration;
    ///
    /// let nav = OperationKind::Navigate.policy();
    /// assert_eq!(nav.attempt_limit(), 3);
    /// assert_eq!(nav.delay_after(2), Some(Duration::from_millis(2000)));
    /// ```
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempt_limit: self.default_attempt_limit(),
            delay: self.default_delay(),
            jitter: JitterStrategy::None,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
