//! # Steadfast
//!
//! Retry-wrapped page objects and scenario scaffolding for end-to-end
//! browser tests.
//!
//! Browser interactions against live sites fail transiently. Steadfast wraps
//! each page action in a bounded retry with an operation-specific delay, logs
//! every attempt, and gives each scenario an isolated browser context that is
//! torn down on every exit path.
//!
//! - [`retry`]: the bounded-retry executor and its policies
//! - [`page`]: the [`Page`](page::Page) and [`Browser`](page::Browser) seams
//!   plus [`PageActions`](page::PageActions)
//! - [`pages`]: page objects for the demo and Amazon flows
//! - [`scenario`]: per-scenario contexts with guaranteed teardown
//! - [`config`], [`logging`], [`report`]: the run's environment
//! - [`testing`]: an in-memory browser for tests
//!
//! ## Quick Example
//!
//! ```rust
//! use std::time::Duration;
//! use steadfast::retry::{execute_with_retry, ConfigurationError, DelayPolicy};
//!
//! #[derive(Debug)]
//! struct Flaky(String);
//!
//! impl std::fmt::Display for Flaky {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         f.write_str(&self.0)
//!     }
//! }
//!
//! impl From<ConfigurationError> for Flaky {
//!     fn from(e: ConfigurationError) -> Self {
//!         Flaky(e.to_string())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let mut calls = 0;
//! let result = execute_with_retry(
//!     "load dashboard",
//!     || {
//!         calls += 1;
//!         let n = calls;
//!         async move {
//!             if n < 2 {
//!                 Err(Flaky("connection reset".into()))
//!             } else {
//!                 Ok("ready")
//!             }
//!         }
//!     },
//!     3,
//!     DelayPolicy::constant(Duration::from_millis(1)),
//! )
//! .await;
//!
//! assert_eq!(result.unwrap(), "ready");
//! # });
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod logging;
pub mod page;
pub mod pages;
pub mod report;
pub mod retry;
pub mod scenario;
pub mod testing;

// Re-exports
pub use config::Settings;
pub use page::{Browser, Page, PageActions, PageError};
pub use retry::{execute_with_retry, ConfigurationError, DelayPolicy, OperationKind, RetryPolicy};
pub use scenario::{run_scenario, Scenario, ScenarioContext, ScenarioError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::page::{Browser, Page, PageActions, PageError, RetryPolicies};
    pub use crate::retry::{
        execute_with_retry, ConfigurationError, DelayPolicy, OperationKind, RetryPolicy,
    };
    pub use crate::scenario::{run_scenario, LaunchOptions, Scenario, ScenarioContext, ScenarioError};
}
