//! Bounded retry for fallible async actions.
//!
//! A [`RetryPolicy`] is plain data: an attempt limit (at least 1) and a
//! [`DelayPolicy`] mapping the index of a failed attempt to the pause before
//! the next one. Executing a policy runs the action until it succeeds or the
//! limit is reached.
//!
//! # Quick Start
//!
//! ```rust
//! use steadfast::retry::{DelayPolicy, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::new(2, DelayPolicy::constant(Duration::from_millis(1))).unwrap();
//!
//! let value: Result<i32, String> = policy.execute("answer", || async { Ok(42) }).await;
//! assert_eq!(value, Ok(42));
//! # });
//! ```
//!
//! # Delay Policies
//!
//! - **None**: retry immediately
//! - **Constant**: fixed delay between attempts
//! - **Linear**: delay grows with the attempt index (1s, 2s, 3s, ...)
//! - **Exponential**: delay doubles with each attempt
//!
//! # Failure rules
//!
//! - The error from the final attempt is returned unchanged. There is no
//!   wrapper type; the attempt count lives in the log trail.
//! - [`RetryPolicy::execute_or_absent`] returns `None` on exhaustion instead.
//! - A zero attempt limit is a [`ConfigurationError`] and nothing runs.
//!
//! # Jitter Support
//!
//! Enable the `jitter` feature to randomize delays with
//! [`RetryPolicy::with_jitter`].

mod error;
mod executor;
mod policy;

pub use error::ConfigurationError;
pub use executor::execute_with_retry;
pub use policy::{DelayPolicy, JitterStrategy, OperationKind, RetryEvent, RetryPolicy};
