//! The bounded-retry executor.
//!
//! Every page interaction in this crate runs through [`RetryPolicy::execute`]
//! or one of its variants. The loop is the same for all of them:
//!
//! 1. log the attempt, run the action
//! 2. on success, return right away
//! 3. on failure, log it; if this was the last attempt, return the error
//!    unchanged, otherwise sleep for the policy's delay and go again

use std::fmt::Display;
use std::future::Future;

use super::error::ConfigurationError;
use super::policy::{DelayPolicy, RetryEvent, RetryPolicy};

/// Run `action` up to `attempt_limit` times with the given delay policy.
///
/// The limit is validated before anything runs: a zero limit returns the
/// [`ConfigurationError`] (converted into the caller's error type) without
/// invoking the action. After that the behavior is [`RetryPolicy::execute`].
///
/// # Example
///
/// ```rust
/// use steadfast::retry::{execute_with_retry, ConfigurationError, DelayPolicy};
/// use std::cell::Cell;
///
/// #[derive(Debug, PartialEq)]
/// enum Error {
///     Flaky,
///     Config(ConfigurationError),
/// }
///
/// impl std::fmt::Display for Error {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{:?}", self)
///     }
/// }
///
/// impl From<ConfigurationError> for Error {
///     fn from(e: ConfigurationError) -> Self {
///         Error::Config(e)
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let calls = Cell::new(0);
/// let result = execute_with_retry(
///     "flaky",
///     || {
///         calls.set(calls.get() + 1);
///         let n = calls.get();
///         async move { if n < 2 { Err(Error::Flaky) } else { Ok(n) } }
///     },
///     3,
///     DelayPolicy::None,
/// )
/// .await;
///
/// assert_eq!(result, Ok(2));
///
/// let rejected: Result<u32, Error> =
///     execute_with_retry("never", || async { Ok(1) }, 0, DelayPolicy::None).await;
/// assert_eq!(rejected, Err(Error::Config(ConfigurationError::new(0))));
/// # });
/// ```
pub async fn execute_with_retry<T, E, F, Fut>(
    operation: &str,
    action: F,
    attempt_limit: u32,
    delay: DelayPolicy,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + From<ConfigurationError>,
{
    let policy = match RetryPolicy::new(attempt_limit, delay) {
        Ok(policy) => policy,
        Err(e) => {
            tracing::error!(operation, attempt_limit, "rejected retry configuration");
            return Err(e.into());
        }
    };
    policy.execute(operation, action).await
}

impl RetryPolicy {
    /// Run `action` under this policy.
    ///
    /// Returns the value of the first successful attempt. When every attempt
    /// fails, the error of the last attempt is returned as-is; earlier errors
    /// are only logged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use steadfast::retry::{DelayPolicy, RetryPolicy};
    ///
    /// # tokio_test::block_on(async {
    /// let policy = RetryPolicy::new(2, DelayPolicy::None).unwrap();
    /// let result: Result<(), String> = policy
    ///     .execute("click", || async { Err("detached".to_string()) })
    ///     .await;
    /// assert_eq!(result, Err("detached".to_string()));
    /// # });
    /// ```
    pub async fn execute<T, E, F, Fut>(&self, operation: &str, action: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.execute_with_hook(operation, action, |_| {}).await
    }

    /// Run `action` under this policy, reporting each failed attempt to `on_retry`.
    ///
    /// The hook is synchronous and runs before the delay; use it for
    /// metrics or test bookkeeping.
    pub async fn execute_with_hook<T, E, F, Fut, H>(
        &self,
        operation: &str,
        mut action: F,
        mut on_retry: H,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        H: FnMut(&RetryEvent<'_, E>),
    {
        let limit = self.attempt_limit();
        let mut attempt = 1u32;

        loop {
            tracing::info!(operation, attempt, limit, "starting attempt");

            match action().await {
                Ok(value) => {
                    tracing::info!(operation, attempt, limit, "attempt succeeded");
                    return Ok(value);
                }
                Err(error) => {
                    tracing::warn!(operation, attempt, limit, %error, "attempt failed");

                    let next_delay = self.delay_with_jitter(attempt);
                    on_retry(&RetryEvent {
                        attempt,
                        attempt_limit: limit,
                        error: &error,
                        next_delay,
                    });

                    match next_delay {
                        Some(d) => {
                            if !d.is_zero() {
                                tokio::time::sleep(d).await;
                            }
                            attempt += 1;
                        }
                        None => {
                            tracing::error!(
                                operation,
                                attempts = attempt,
                                %error,
                                "all attempts exhausted"
                            );
                            return Err(error);
                        }
                    }
                }
            }
        }
    }

    /// Run `action` under this policy, turning exhaustion into `None`.
    ///
    /// Text reads use this: a page element that never yields its text is
    /// reported as absent rather than as a failure. The attempt and log
    /// behavior is identical to [`RetryPolicy::execute`].
    pub async fn execute_or_absent<T, E, F, Fut>(&self, operation: &str, action: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.execute(operation, action).await.ok()
    }
}
